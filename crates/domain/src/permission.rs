use posguard_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::ids::PermissionId;
use crate::operation::OperationToken;
use crate::screen::ScreenScope;

/// Input payload for [`Permission::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionInput {
    /// Stored identifier.
    pub id: PermissionId,
    /// Unique code such as `GRN.CREATE`.
    pub code: String,
    /// Label shown in permission editors.
    pub display_name: String,
    /// Screen the permission targets.
    pub screen: Option<ScreenScope>,
    /// Operation the permission grants.
    pub operation: Option<OperationToken>,
    /// Grouping row for child permissions.
    pub is_parent: bool,
    /// Parent grouping row.
    pub parent_permission_id: Option<PermissionId>,
}

/// Immutable permission catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    code: NonEmptyString,
    display_name: String,
    screen: Option<ScreenScope>,
    operation: Option<OperationToken>,
    is_parent: bool,
    parent_permission_id: Option<PermissionId>,
}

impl Permission {
    /// Creates a validated permission.
    ///
    /// A leaf permission must target exactly one screen scope and one
    /// operation token. A grouping row may carry both or neither.
    pub fn new(input: PermissionInput) -> AppResult<Self> {
        let code = NonEmptyString::new(input.code.trim())?;

        if !input.is_parent && (input.screen.is_none() || input.operation.is_none()) {
            return Err(AppError::Validation(format!(
                "leaf permission '{}' must have a screen and an operation",
                code.as_str()
            )));
        }

        if input.screen.is_some() != input.operation.is_some() {
            return Err(AppError::Validation(format!(
                "permission '{}' must set screen and operation together",
                code.as_str()
            )));
        }

        if input.parent_permission_id == Some(input.id) {
            return Err(AppError::Validation(format!(
                "permission '{}' cannot be its own parent",
                code.as_str()
            )));
        }

        let display_name = if input.display_name.trim().is_empty() {
            code.as_str().to_owned()
        } else {
            input.display_name
        };

        Ok(Self {
            id: input.id,
            code,
            display_name,
            screen: input.screen,
            operation: input.operation,
            is_parent: input.is_parent,
            parent_permission_id: input.parent_permission_id,
        })
    }

    /// Returns the stored identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the code as stored.
    #[must_use]
    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    /// Returns the code in the uppercase form used for lookups.
    #[must_use]
    pub fn normalized_code(&self) -> String {
        self.code.as_str().to_uppercase()
    }

    /// Returns the display label.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the targeted screen scope.
    #[must_use]
    pub fn screen(&self) -> Option<ScreenScope> {
        self.screen
    }

    /// Returns the granted operation token.
    #[must_use]
    pub fn operation(&self) -> Option<OperationToken> {
        self.operation
    }

    /// Returns whether this row groups child permissions.
    #[must_use]
    pub fn is_parent(&self) -> bool {
        self.is_parent
    }

    /// Returns the parent grouping row.
    #[must_use]
    pub fn parent_permission_id(&self) -> Option<PermissionId> {
        self.parent_permission_id
    }

    /// Returns the (screen, operation) target when both are set.
    #[must_use]
    pub fn target(&self) -> Option<(ScreenScope, OperationToken)> {
        self.screen.zip(self.operation)
    }
}
