use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use posguard_application::{
    NewPermissionOverride, PermissionOverrideRepository, PermissionRepository,
};
use posguard_core::{AppError, AppResult};
use posguard_domain::{
    OverrideId, Permission, PermissionId, UserId, UserPermissionOverride,
    UserPermissionOverrideInput,
};
use tokio::sync::RwLock;

/// In-memory permission repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryPermissionRepository {
    permissions: RwLock<BTreeMap<PermissionId, Permission>>,
    user_grants: RwLock<HashMap<UserId, BTreeSet<PermissionId>>>,
    overrides: RwLock<BTreeMap<OverrideId, UserPermissionOverride>>,
}

impl InMemoryPermissionRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a catalog permission. Ids and codes must be unique.
    pub async fn save_permission(&self, permission: Permission) -> AppResult<()> {
        let mut permissions = self.permissions.write().await;

        if permissions.contains_key(&permission.id()) {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                permission.id()
            )));
        }

        if permissions
            .values()
            .any(|existing| existing.normalized_code() == permission.normalized_code())
        {
            return Err(AppError::Conflict(format!(
                "permission code '{}' already exists",
                permission.code()
            )));
        }

        permissions.insert(permission.id(), permission);
        Ok(())
    }

    /// Replaces the role-derived grants of a user.
    pub async fn assign_permissions(
        &self,
        user_id: UserId,
        permission_ids: impl IntoIterator<Item = PermissionId>,
    ) -> AppResult<()> {
        let permission_ids: BTreeSet<PermissionId> = permission_ids.into_iter().collect();
        {
            let permissions = self.permissions.read().await;
            if let Some(missing) = permission_ids
                .iter()
                .find(|permission_id| !permissions.contains_key(permission_id))
            {
                return Err(AppError::NotFound(format!(
                    "permission '{missing}' does not exist"
                )));
            }
        }

        self.user_grants
            .write()
            .await
            .insert(user_id, permission_ids);
        Ok(())
    }
}

#[async_trait]
impl PermissionRepository for InMemoryPermissionRepository {
    async fn list_role_permission_ids(&self, user_id: UserId) -> AppResult<Vec<PermissionId>> {
        Ok(self
            .user_grants
            .read()
            .await
            .get(&user_id)
            .map(|grants| grants.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        Ok(self.permissions.read().await.values().cloned().collect())
    }

    async fn list_overrides_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        Ok(self
            .overrides
            .read()
            .await
            .values()
            .filter(|value| value.user_id() == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PermissionOverrideRepository for InMemoryPermissionRepository {
    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        Ok(self.permissions.read().await.get(&permission_id).cloned())
    }

    async fn create_override(
        &self,
        input: NewPermissionOverride,
    ) -> AppResult<UserPermissionOverride> {
        let mut overrides = self.overrides.write().await;
        let next_id = overrides
            .keys()
            .next_back()
            .map_or(1, |last| last.as_i64() + 1);

        let value = UserPermissionOverride::new(UserPermissionOverrideInput {
            id: OverrideId::new(next_id),
            user_id: input.user_id,
            permission_id: input.permission_id,
            effect: input.effect,
            window: input.window,
            reason: input.reason,
            created_at: input.created_at,
            revoked_at: None,
        });
        overrides.insert(value.id(), value.clone());

        Ok(value)
    }

    async fn find_override(
        &self,
        override_id: OverrideId,
    ) -> AppResult<Option<UserPermissionOverride>> {
        Ok(self.overrides.read().await.get(&override_id).cloned())
    }

    async fn revoke_override(
        &self,
        override_id: OverrideId,
        revoked_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut overrides = self.overrides.write().await;
        let Some(current) = overrides.get(&override_id) else {
            return Err(AppError::NotFound(format!(
                "override '{override_id}' does not exist"
            )));
        };

        if current.revoked_at().is_some() {
            return Err(AppError::Conflict(format!(
                "override '{override_id}' is already revoked"
            )));
        }

        let revoked = UserPermissionOverride::new(UserPermissionOverrideInput {
            id: current.id(),
            user_id: current.user_id(),
            permission_id: current.permission_id(),
            effect: current.effect(),
            window: current.window(),
            reason: current.reason().map(str::to_owned),
            created_at: current.created_at(),
            revoked_at: Some(revoked_at),
        });
        overrides.insert(override_id, revoked);

        Ok(())
    }
}
