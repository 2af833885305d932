//! Per-user permission cache.
//!
//! The cache is built once from the user's effective permissions and is
//! immutable afterwards. Every query is total and answers from memory; an
//! expired cache keeps answering, callers check [`UserPermissionCache::is_expired`]
//! and rebuild.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use posguard_domain::{
    Operation, OperationScope, OperationToken, Permission, PermissionId, Screen, ScreenScope,
    UserId,
};

const FULL_ACCESS_OPERATIONS: &[Operation] = &[
    Operation::Create,
    Operation::Read,
    Operation::Update,
    Operation::Delete,
    Operation::View,
];

const MUTATING_OPERATIONS: &[Operation] = &[Operation::Create, Operation::Update, Operation::Delete];

/// Permission snapshot held by the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPermission {
    /// Catalog identifier.
    pub permission_id: PermissionId,
    /// Uppercased permission code.
    pub code: String,
    /// Display label.
    pub display_name: String,
    /// Targeted screen scope.
    pub screen: Option<ScreenScope>,
    /// Granted operation token.
    pub operation: Option<OperationToken>,
    /// Parent grouping row.
    pub parent_permission_id: Option<PermissionId>,
}

impl From<&Permission> for CachedPermission {
    fn from(value: &Permission) -> Self {
        Self {
            permission_id: value.id(),
            code: value.normalized_code(),
            display_name: value.display_name().to_owned(),
            screen: value.screen(),
            operation: value.operation(),
            parent_permission_id: value.parent_permission_id(),
        }
    }
}

type OperationIndex = HashMap<OperationScope, Vec<CachedPermission>>;

/// Effective permissions of one user with a bounded validity window.
#[derive(Debug, Clone)]
pub struct UserPermissionCache {
    user_id: UserId,
    all_permissions: HashMap<String, CachedPermission>,
    screen_permissions: HashMap<ScreenScope, OperationIndex>,
    cached_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl UserPermissionCache {
    /// Builds the cache from effective permissions.
    ///
    /// Codes are indexed uppercased. Rows carrying a screen and an operation
    /// are also indexed by (screen, operation); composite tokens are expanded
    /// to the scopes they stand for. Rows are keyed by uppercased code: when two
    /// rows share a code, only the first is kept in either index.
    #[must_use]
    pub fn build<'a>(
        user_id: UserId,
        permissions: impl IntoIterator<Item = &'a Permission>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let mut all_permissions: HashMap<String, CachedPermission> = HashMap::new();
        let mut screen_permissions: HashMap<ScreenScope, OperationIndex> = HashMap::new();

        for permission in permissions {
            let cached = CachedPermission::from(permission);
            if all_permissions.contains_key(&cached.code) {
                continue;
            }

            if let Some((screen, operation)) = permission.target() {
                let scopes = operation.scopes();
                if !scopes.is_empty() {
                    let operations = screen_permissions.entry(screen).or_default();
                    for scope in scopes {
                        operations.entry(scope).or_default().push(cached.clone());
                    }
                }
            }

            all_permissions.insert(cached.code.clone(), cached);
        }

        Self {
            user_id,
            all_permissions,
            screen_permissions,
            cached_at: now,
            expires_at: now + ttl,
        }
    }

    /// Builds a cache granting nothing.
    #[must_use]
    pub fn empty(user_id: UserId, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self::build(user_id, std::iter::empty(), now, ttl)
    }

    /// Returns the user the cache was built for.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the build timestamp.
    #[must_use]
    pub fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }

    /// Returns the end of the validity window.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns the number of distinct permission codes held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.all_permissions.len()
    }

    /// Returns true when no permission is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all_permissions.is_empty()
    }

    /// Case-insensitive lookup by permission code.
    #[must_use]
    pub fn has_permission_code(&self, code: &str) -> bool {
        self.all_permissions
            .contains_key(&code.trim().to_uppercase())
    }

    /// Returns whether the user may perform `operation` on `screen`.
    ///
    /// Checked in order, first match wins: all screens with all operations,
    /// all screens with the operation, the screen with all operations, the
    /// screen with the operation.
    #[must_use]
    pub fn has_permission(
        &self,
        screen: impl Into<ScreenScope>,
        operation: impl Into<OperationScope>,
    ) -> bool {
        let screen = screen.into();
        let operation = operation.into();

        if let Some(operations) = self.screen_permissions.get(&ScreenScope::All) {
            if operations.contains_key(&OperationScope::All) || operations.contains_key(&operation)
            {
                return true;
            }
        }

        self.screen_permissions
            .get(&screen)
            .is_some_and(|operations| {
                operations.contains_key(&OperationScope::All) || operations.contains_key(&operation)
            })
    }

    /// Raw-token variant of [`Self::has_permission`]. Unknown tokens never match.
    #[must_use]
    pub fn has_permission_tokens(&self, screen: &str, operation: &str) -> bool {
        match (ScreenScope::from_str(screen), OperationScope::from_str(operation)) {
            (Ok(screen), Ok(operation)) => self.has_permission(screen, operation),
            _ => false,
        }
    }

    /// Returns permissions backing access to `screen`, from the all-screens
    /// bucket and the screen's own bucket, without duplicates.
    #[must_use]
    pub fn screen_permissions(&self, screen: Screen) -> Vec<CachedPermission> {
        let mut seen = HashSet::new();
        [ScreenScope::All, ScreenScope::Only(screen)]
            .iter()
            .filter_map(|scope| self.screen_permissions.get(scope))
            .flat_map(|operations| operations.values().flatten())
            .filter(|permission| seen.insert(permission.permission_id))
            .cloned()
            .collect()
    }

    /// Returns every operation the user may perform on `screen`, in catalog order.
    ///
    /// A wildcard operation grant on either level resolves to the full catalog.
    #[must_use]
    pub fn screen_operations(&self, screen: Screen) -> Vec<Operation> {
        let mut granted = HashSet::new();

        for scope in [ScreenScope::All, ScreenScope::Only(screen)] {
            let Some(operations) = self.screen_permissions.get(&scope) else {
                continue;
            };

            for operation in operations.keys() {
                match operation {
                    OperationScope::All => return Operation::all().to_vec(),
                    OperationScope::Only(operation) => {
                        granted.insert(*operation);
                    }
                }
            }
        }

        Operation::all()
            .iter()
            .copied()
            .filter(|operation| granted.contains(operation))
            .collect()
    }

    /// Returns whether any grant touches `screen`, directly or through the wildcard.
    #[must_use]
    pub fn has_any_screen_permission(&self, screen: Screen) -> bool {
        self.screen_permissions.contains_key(&ScreenScope::All)
            || self
                .screen_permissions
                .contains_key(&ScreenScope::Only(screen))
    }

    /// Returns whether the user holds full access on `screen`.
    ///
    /// True for the universal grant, an all-operations grant on the screen, or
    /// when the screen's own grants cover Create, Read, Update, Delete and View.
    #[must_use]
    pub fn has_full_access(&self, screen: Screen) -> bool {
        let universal = self
            .screen_permissions
            .get(&ScreenScope::All)
            .is_some_and(|operations| operations.contains_key(&OperationScope::All));
        if universal {
            return true;
        }

        let Some(operations) = self.screen_permissions.get(&ScreenScope::Only(screen)) else {
            return false;
        };

        operations.contains_key(&OperationScope::All)
            || FULL_ACCESS_OPERATIONS
                .iter()
                .all(|operation| operations.contains_key(&OperationScope::Only(*operation)))
    }

    /// Returns whether the screen's own grants allow looking but not changing.
    ///
    /// View or Read must be granted and none of Create, Update, Delete. False
    /// when the screen has no grants of its own.
    #[must_use]
    pub fn has_view_only_access(&self, screen: Screen) -> bool {
        let Some(operations) = self.screen_permissions.get(&ScreenScope::Only(screen)) else {
            return false;
        };

        if operations.contains_key(&OperationScope::All) {
            return false;
        }

        let can_look = operations.contains_key(&OperationScope::Only(Operation::View))
            || operations.contains_key(&OperationScope::Only(Operation::Read));
        let can_change = MUTATING_OPERATIONS
            .iter()
            .any(|operation| operations.contains_key(&OperationScope::Only(*operation)));

        can_look && !can_change
    }

    /// Returns whether the validity window has elapsed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns whether the validity window has elapsed at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
