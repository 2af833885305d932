use std::sync::Arc;

use chrono::{DateTime, Utc};
use posguard_core::{AppError, AppResult};
use posguard_domain::{Operation, Screen, UserId};

use crate::{PermissionCacheBuilder, PermissionCacheStore, UserPermissionCache};

/// Summary of what a user may do on one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenAccess {
    /// Screen the summary describes.
    pub screen: Screen,
    /// Granted operations in catalog order.
    pub operations: Vec<Operation>,
    /// Whether the screen carries a full access grant.
    pub has_full_access: bool,
    /// Whether the screen is limited to viewing.
    pub has_view_only_access: bool,
    /// Whether any grant touches the screen.
    pub has_any_permission: bool,
}

/// Application service answering access checks from per-user caches.
#[derive(Clone)]
pub struct AccessControlService {
    builder: PermissionCacheBuilder,
    cache_store: Arc<dyn PermissionCacheStore>,
}

impl AccessControlService {
    /// Creates a new access control service.
    #[must_use]
    pub fn new(builder: PermissionCacheBuilder, cache_store: Arc<dyn PermissionCacheStore>) -> Self {
        Self {
            builder,
            cache_store,
        }
    }

    /// Returns the current cache for a user, rebuilding it when missing or expired.
    pub async fn cache_for(&self, user_id: UserId) -> AppResult<Arc<UserPermissionCache>> {
        self.cache_for_at(user_id, Utc::now()).await
    }

    /// Same as [`Self::cache_for`] with an explicit clock.
    ///
    /// A cache built across an invalidation is returned to this caller but not
    /// stored, so the next access rebuilds.
    pub async fn cache_for_at(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Arc<UserPermissionCache>> {
        if let Some(cache) = self.cache_store.get(user_id).await?
            && !cache.is_expired_at(now)
        {
            return Ok(cache);
        }

        let generation = self.cache_store.generation(user_id).await?;
        let cache = Arc::new(self.builder.build_cache_at(user_id, now).await?);
        self.cache_store.put(Arc::clone(&cache), generation).await?;
        Ok(cache)
    }

    /// Drops the stored cache so the next access rebuilds it.
    pub async fn invalidate(&self, user_id: UserId) -> AppResult<bool> {
        self.cache_store.remove(user_id).await
    }

    /// Returns whether the user may run an operation on a screen.
    pub async fn has_screen_operation(
        &self,
        user_id: UserId,
        screen: Screen,
        operation: Operation,
    ) -> AppResult<bool> {
        Ok(self
            .cache_for(user_id)
            .await?
            .has_permission(screen, operation))
    }

    /// Ensures the user may run an operation on a screen.
    pub async fn require_screen_operation(
        &self,
        user_id: UserId,
        screen: Screen,
        operation: Operation,
    ) -> AppResult<()> {
        if self.has_screen_operation(user_id, screen, operation).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{user_id}' may not {} on screen '{}'",
            operation.as_str(),
            screen.as_str()
        )))
    }

    /// Returns whether the user holds a permission by code.
    pub async fn has_permission_code(&self, user_id: UserId, code: &str) -> AppResult<bool> {
        Ok(self.cache_for(user_id).await?.has_permission_code(code))
    }

    /// Summarizes the user's access to one screen.
    pub async fn screen_access(&self, user_id: UserId, screen: Screen) -> AppResult<ScreenAccess> {
        let cache = self.cache_for(user_id).await?;

        Ok(ScreenAccess {
            screen,
            operations: cache.screen_operations(screen),
            has_full_access: cache.has_full_access(screen),
            has_view_only_access: cache.has_view_only_access(screen),
            has_any_permission: cache.has_any_screen_permission(screen),
        })
    }
}
