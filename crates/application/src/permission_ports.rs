use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use posguard_core::AppResult;
use posguard_domain::{
    OverrideEffect, OverrideId, Permission, PermissionId, UserId, UserPermissionOverride,
    ValidityWindow,
};

use crate::UserPermissionCache;

/// Read port over the persisted permission records of a user.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Lists permission ids granted through the user's role assignment.
    async fn list_role_permission_ids(&self, user_id: UserId) -> AppResult<Vec<PermissionId>>;

    /// Lists the whole permission catalog.
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;

    /// Lists every override recorded for the user, active or not.
    async fn list_overrides_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<UserPermissionOverride>>;
}

/// Override row to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPermissionOverride {
    /// User the override applies to.
    pub user_id: UserId,
    /// Overridden permission.
    pub permission_id: PermissionId,
    /// Allow or deny.
    pub effect: OverrideEffect,
    /// Validity window.
    pub window: ValidityWindow,
    /// Administrator's reason.
    pub reason: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Write port used by override administration.
#[async_trait]
pub trait PermissionOverrideRepository: Send + Sync {
    /// Finds one catalog permission.
    async fn find_permission(&self, permission_id: PermissionId)
    -> AppResult<Option<Permission>>;

    /// Persists an override and returns it with its assigned id.
    async fn create_override(
        &self,
        input: NewPermissionOverride,
    ) -> AppResult<UserPermissionOverride>;

    /// Finds one override.
    async fn find_override(
        &self,
        override_id: OverrideId,
    ) -> AppResult<Option<UserPermissionOverride>>;

    /// Marks an override revoked. The row is kept.
    async fn revoke_override(
        &self,
        override_id: OverrideId,
        revoked_at: DateTime<Utc>,
    ) -> AppResult<()>;
}

/// Session-scoped holder of built caches.
///
/// Implementations replace whole entries; a cache handed out to a reader is
/// never mutated. Each user carries a generation that [`Self::remove`]
/// advances, so a cache built before an invalidation is never stored after it.
#[async_trait]
pub trait PermissionCacheStore: Send + Sync {
    /// Returns the stored cache for a user.
    async fn get(&self, user_id: UserId) -> AppResult<Option<Arc<UserPermissionCache>>>;

    /// Returns the user's current generation.
    async fn generation(&self, user_id: UserId) -> AppResult<u64>;

    /// Stores a cache built while the user was at `generation`, replacing any
    /// previous one. Returns false and stores nothing when the generation moved.
    async fn put(&self, cache: Arc<UserPermissionCache>, generation: u64) -> AppResult<bool>;

    /// Drops the cache for a user and advances the generation. Returns whether
    /// a cache was stored.
    async fn remove(&self, user_id: UserId) -> AppResult<bool>;
}
