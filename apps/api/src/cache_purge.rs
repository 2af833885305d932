use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use posguard_infrastructure::InMemoryPermissionCacheStore;
use tokio::task::JoinHandle;
use tracing::info;

/// Periodically drops expired permission caches from the store.
pub fn spawn_cache_purge_worker(
    cache_store: Arc<InMemoryPermissionCacheStore>,
    interval_seconds: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_seconds, "permission cache purge worker started");

        loop {
            cache_store.purge_expired(Utc::now()).await;
            tokio::time::sleep(Duration::from_secs(interval_seconds)).await;
        }
    })
}
