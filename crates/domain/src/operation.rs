use std::fmt::{Display, Formatter};
use std::str::FromStr;

use posguard_core::AppError;
use serde::{Deserialize, Serialize};

/// Storage value used for the "all operations" wildcard.
pub const ALL_OPERATIONS_STORAGE_VALUE: &str = "*";

/// Display sentinel shown by selection lists for the "all operations" wildcard.
pub const ALL_OPERATIONS_SENTINEL: &str = "-- All Operations --";

/// Base action kinds a permission can grant on a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operation {
    /// Create new records.
    Create,
    /// Read record details.
    Read,
    /// Update existing records.
    Update,
    /// Delete records.
    Delete,
    /// Open the screen.
    View,
    /// Export data from the screen.
    Export,
    /// Import data into the screen.
    Import,
    /// Print documents produced by the screen.
    Print,
}

impl Operation {
    /// Returns the stable storage value for this operation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Read => "Read",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::View => "View",
            Self::Export => "Export",
            Self::Import => "Import",
            Self::Print => "Print",
        }
    }

    /// Returns all base operations in catalog order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Operation] = &[
            Operation::Create,
            Operation::Read,
            Operation::Update,
            Operation::Delete,
            Operation::View,
            Operation::Export,
            Operation::Import,
            Operation::Print,
        ];

        ALL
    }

    /// Returns the human-readable label.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Read => "Read",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::View => "View",
            Self::Export => "Export",
            Self::Import => "Import",
            Self::Print => "Print",
        }
    }

    /// Returns a one-line description of what the operation allows.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Create => "Add new records",
            Self::Read => "Read record details",
            Self::Update => "Edit existing records",
            Self::Delete => "Remove records",
            Self::View => "Open the screen",
            Self::Export => "Export data to a file",
            Self::Import => "Import data from a file",
            Self::Print => "Print documents and reports",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::all()
            .iter()
            .copied()
            .find(|operation| operation.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| AppError::Validation(format!("unknown operation '{value}'")))
    }
}

/// Declarative shorthands that stand for a group of base operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompositeOperation {
    /// Every operation on the screen.
    FullAccess,
    /// View and Read only.
    ViewOnly,
    /// Nothing.
    NoAccess,
}

impl CompositeOperation {
    /// Returns the stable storage value for this shorthand.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullAccess => "FullAccess",
            Self::ViewOnly => "ViewOnly",
            Self::NoAccess => "NoAccess",
        }
    }

    /// Returns all shorthands.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::FullAccess, Self::ViewOnly, Self::NoAccess]
    }

    /// Returns the human-readable label.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::FullAccess => "Full Access",
            Self::ViewOnly => "View Only",
            Self::NoAccess => "No Access",
        }
    }

    /// Returns a one-line description of the shorthand.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::FullAccess => "All operations on the screen",
            Self::ViewOnly => "Open the screen and read records without changing them",
            Self::NoAccess => "No operations on the screen",
        }
    }

    /// Returns the operation scopes this shorthand grants.
    #[must_use]
    pub fn scopes(&self) -> &'static [OperationScope] {
        match self {
            Self::FullAccess => &[OperationScope::All],
            Self::ViewOnly => &[
                OperationScope::Only(Operation::View),
                OperationScope::Only(Operation::Read),
            ],
            Self::NoAccess => &[],
        }
    }
}

impl FromStr for CompositeOperation {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::all()
            .iter()
            .copied()
            .find(|composite| composite.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| AppError::Validation(format!("unknown composite operation '{value}'")))
    }
}

/// Operation slot of the permission index: one operation or the wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationScope {
    /// Every operation.
    All,
    /// One concrete operation.
    Only(Operation),
}

impl OperationScope {
    /// Returns true for the wildcard scope.
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl From<Operation> for OperationScope {
    fn from(value: Operation) -> Self {
        Self::Only(value)
    }
}

impl FromStr for OperationScope {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if is_all_operations_token(value) {
            return Ok(Self::All);
        }

        Operation::from_str(value).map(Self::Only)
    }
}

/// Operation carried by a permission row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationToken {
    /// The "all operations" wildcard.
    Any,
    /// A base operation.
    Base(Operation),
    /// A declarative shorthand.
    Composite(CompositeOperation),
}

impl OperationToken {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => ALL_OPERATIONS_STORAGE_VALUE,
            Self::Base(operation) => operation.as_str(),
            Self::Composite(composite) => composite.as_str(),
        }
    }

    /// Returns the index scopes this token grants.
    #[must_use]
    pub fn scopes(&self) -> Vec<OperationScope> {
        match self {
            Self::Any => vec![OperationScope::All],
            Self::Base(operation) => vec![OperationScope::Only(*operation)],
            Self::Composite(composite) => composite.scopes().to_vec(),
        }
    }
}

impl Display for OperationToken {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for OperationToken {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if is_all_operations_token(value) {
            return Ok(Self::Any);
        }

        if let Ok(operation) = Operation::from_str(value) {
            return Ok(Self::Base(operation));
        }

        CompositeOperation::from_str(value)
            .map(Self::Composite)
            .map_err(|_| AppError::Validation(format!("unknown operation '{value}'")))
    }
}

/// Returns whether the token is a form of the "all operations" wildcard.
#[must_use]
pub fn is_all_operations_token(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed == ALL_OPERATIONS_STORAGE_VALUE
        || trimmed.eq_ignore_ascii_case(ALL_OPERATIONS_SENTINEL)
        || trimmed.eq_ignore_ascii_case("AllOperations")
}
