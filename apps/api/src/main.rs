//! Posguard API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod cache_purge;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::str::FromStr;
use std::sync::Arc;

use posguard_application::{
    AccessControlService, PermissionCacheBuilder, PermissionOverrideService,
};
use posguard_core::AppError;
use posguard_infrastructure::{InMemoryPermissionCacheStore, SqlitePermissionRepository};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let cache_config = config.permission_cache_config()?;

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(|error| AppError::Validation(format!("invalid DATABASE_URL: {error}")))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let permission_repository = Arc::new(SqlitePermissionRepository::new(pool));
    let cache_store = Arc::new(InMemoryPermissionCacheStore::new());
    let _cache_purge_worker = cache_purge::spawn_cache_purge_worker(
        cache_store.clone(),
        config.cache_purge_interval_seconds,
    );
    let access_control_service = AccessControlService::new(
        PermissionCacheBuilder::new(permission_repository.clone(), cache_config),
        cache_store,
    );
    let permission_override_service = PermissionOverrideService::new(
        access_control_service.clone(),
        permission_repository.clone(),
        permission_repository,
    );

    let app = api_router::build_router(AppState {
        access_control_service,
        permission_override_service,
    });

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind {address}: {error}")))?;

    info!(
        %address,
        cache_ttl_seconds = config.permission_cache_ttl_seconds,
        "posguard api listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("server error: {error}")))
}
