use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use posguard_application::{PermissionCacheStore, UserPermissionCache};
use posguard_core::AppResult;
use posguard_domain::UserId;
use tokio::sync::RwLock;

#[derive(Default)]
struct CacheEntries {
    caches: HashMap<UserId, Arc<UserPermissionCache>>,
    generations: HashMap<UserId, u64>,
}

impl CacheEntries {
    fn generation(&self, user_id: UserId) -> u64 {
        self.generations.get(&user_id).copied().unwrap_or_default()
    }
}

/// In-memory store of per-user permission caches.
#[derive(Default)]
pub struct InMemoryPermissionCacheStore {
    entries: RwLock<CacheEntries>,
}

impl InMemoryPermissionCacheStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every cache whose window elapsed before `now`. Returns how many were dropped.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.caches.len();
        entries.caches.retain(|_, cache| !cache.is_expired_at(now));
        let purged = before - entries.caches.len();

        if purged > 0 {
            tracing::debug!(purged, "purged expired permission caches");
        }

        purged
    }
}

#[async_trait]
impl PermissionCacheStore for InMemoryPermissionCacheStore {
    async fn get(&self, user_id: UserId) -> AppResult<Option<Arc<UserPermissionCache>>> {
        Ok(self.entries.read().await.caches.get(&user_id).cloned())
    }

    async fn generation(&self, user_id: UserId) -> AppResult<u64> {
        Ok(self.entries.read().await.generation(user_id))
    }

    async fn put(&self, cache: Arc<UserPermissionCache>, generation: u64) -> AppResult<bool> {
        let user_id = cache.user_id();
        let permissions = cache.len();
        let expires_at = cache.expires_at();

        let mut entries = self.entries.write().await;
        if entries.generation(user_id) != generation {
            tracing::debug!(
                user_id = %user_id,
                "discarded permission cache built before invalidation"
            );
            return Ok(false);
        }

        entries.caches.insert(user_id, cache);
        tracing::debug!(
            user_id = %user_id,
            permissions,
            expires_at = %expires_at.to_rfc3339(),
            "stored permission cache"
        );

        Ok(true)
    }

    async fn remove(&self, user_id: UserId) -> AppResult<bool> {
        let mut entries = self.entries.write().await;
        *entries.generations.entry(user_id).or_default() += 1;
        let removed = entries.caches.remove(&user_id).is_some();
        if removed {
            tracing::debug!(user_id = %user_id, "invalidated permission cache");
        }

        Ok(removed)
    }
}
