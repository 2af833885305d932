use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use posguard_core::AppResult;
use posguard_domain::{OverrideEffect, Permission, PermissionId, UserId, UserPermissionOverride};

use crate::{PermissionCacheConfig, PermissionRepository, UserPermissionCache};

/// Merges role grants and overrides into the effective permission set.
///
/// Role grants come first, allow overrides active at `now` are added, then
/// deny overrides active at `now` remove their permission whatever granted
/// it. Inactive overrides and ids missing from the catalog are ignored. The
/// result keeps catalog order.
#[must_use]
pub fn effective_permissions(
    role_permission_ids: &[PermissionId],
    catalog: &[Permission],
    overrides: &[UserPermissionOverride],
    now: DateTime<Utc>,
) -> Vec<Permission> {
    let catalog_ids: HashSet<PermissionId> = catalog.iter().map(Permission::id).collect();
    let mut granted: HashSet<PermissionId> = role_permission_ids
        .iter()
        .copied()
        .filter(|permission_id| catalog_ids.contains(permission_id))
        .collect();

    let active: Vec<&UserPermissionOverride> = overrides
        .iter()
        .filter(|value| value.is_active_at(now) && catalog_ids.contains(&value.permission_id()))
        .collect();

    for value in &active {
        if value.effect() == OverrideEffect::Allow {
            granted.insert(value.permission_id());
        }
    }

    for value in &active {
        if value.effect() == OverrideEffect::Deny {
            granted.remove(&value.permission_id());
        }
    }

    catalog
        .iter()
        .filter(|permission| granted.contains(&permission.id()))
        .cloned()
        .collect()
}

/// Builds [`UserPermissionCache`] instances from the permission store.
#[derive(Clone)]
pub struct PermissionCacheBuilder {
    repository: Arc<dyn PermissionRepository>,
    config: PermissionCacheConfig,
}

impl PermissionCacheBuilder {
    /// Creates a builder over a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn PermissionRepository>, config: PermissionCacheConfig) -> Self {
        Self { repository, config }
    }

    /// Returns the config caches are built with.
    #[must_use]
    pub fn config(&self) -> PermissionCacheConfig {
        self.config
    }

    /// Builds a fresh cache for a user.
    pub async fn build_cache(&self, user_id: UserId) -> AppResult<UserPermissionCache> {
        self.build_cache_at(user_id, Utc::now()).await
    }

    /// Builds a fresh cache for a user as of `now`.
    ///
    /// Store failures propagate unchanged; nothing is retried.
    pub async fn build_cache_at(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<UserPermissionCache> {
        let role_permission_ids = self.repository.list_role_permission_ids(user_id).await?;
        let catalog = self.repository.list_permissions().await?;
        let overrides: Vec<UserPermissionOverride> = self
            .repository
            .list_overrides_for_user(user_id)
            .await?
            .into_iter()
            .filter(|value| value.user_id() == user_id)
            .collect();

        let permissions = effective_permissions(&role_permission_ids, &catalog, &overrides, now);

        Ok(UserPermissionCache::build(
            user_id,
            &permissions,
            now,
            self.config.ttl(),
        ))
    }
}
