use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use posguard_application::{DEFAULT_PERMISSION_CACHE_TTL_SECONDS, PermissionCacheConfig};
use posguard_core::AppError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub permission_cache_ttl_seconds: u32,
    pub cache_purge_interval_seconds: u64,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    pub fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let database_url = required_non_empty(&lookup, "DATABASE_URL")?;
        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = parse_or_default(&lookup, "API_PORT", 3001_u16)?;
        let permission_cache_ttl_seconds = parse_or_default(
            &lookup,
            "PERMISSION_CACHE_TTL_SECONDS",
            DEFAULT_PERMISSION_CACHE_TTL_SECONDS,
        )?;

        let cache_purge_interval_seconds =
            parse_or_default(&lookup, "PERMISSION_CACHE_PURGE_INTERVAL_SECONDS", 300_u64)?;

        if permission_cache_ttl_seconds == 0 {
            return Err(AppError::Validation(
                "PERMISSION_CACHE_TTL_SECONDS must be greater than zero".to_owned(),
            ));
        }

        if cache_purge_interval_seconds == 0 {
            return Err(AppError::Validation(
                "PERMISSION_CACHE_PURGE_INTERVAL_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            migrate_only,
            database_url,
            api_host,
            api_port,
            permission_cache_ttl_seconds,
            cache_purge_interval_seconds,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    pub fn permission_cache_config(&self) -> Result<PermissionCacheConfig, AppError> {
        PermissionCacheConfig::from_seconds(self.permission_cache_ttl_seconds)
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, AppError> {
    let value = lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}"))),
        _ => Ok(default),
    }
}
