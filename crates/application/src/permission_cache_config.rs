use chrono::Duration;
use posguard_core::{AppError, AppResult};

/// Default cache validity window in seconds.
pub const DEFAULT_PERMISSION_CACHE_TTL_SECONDS: u32 = 60 * 60;

/// Settings for building permission caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionCacheConfig {
    ttl: Duration,
}

impl PermissionCacheConfig {
    /// Creates a config with the given validity window.
    pub fn new(ttl: Duration) -> AppResult<Self> {
        if ttl <= Duration::zero() {
            return Err(AppError::Validation(
                "permission cache ttl must be greater than zero".to_owned(),
            ));
        }

        Ok(Self { ttl })
    }

    /// Creates a config from a window in seconds.
    pub fn from_seconds(ttl_seconds: u32) -> AppResult<Self> {
        Self::new(Duration::seconds(i64::from(ttl_seconds)))
    }

    /// Returns the validity window.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for PermissionCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(i64::from(DEFAULT_PERMISSION_CACHE_TTL_SECONDS)),
        }
    }
}
