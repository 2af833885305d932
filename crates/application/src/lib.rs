//! Application services and ports.

#![forbid(unsafe_code)]

mod access_control_service;
mod permission_cache;
mod permission_cache_builder;
mod permission_cache_config;
mod permission_override_service;
mod permission_ports;

#[cfg(test)]
mod test_support;

pub use access_control_service::{AccessControlService, ScreenAccess};
pub use permission_cache::{CachedPermission, UserPermissionCache};
pub use permission_cache_builder::{PermissionCacheBuilder, effective_permissions};
pub use permission_cache_config::{DEFAULT_PERMISSION_CACHE_TTL_SECONDS, PermissionCacheConfig};
pub use permission_override_service::{GrantOverrideInput, PermissionOverrideService};
pub use permission_ports::{
    NewPermissionOverride, PermissionCacheStore, PermissionOverrideRepository,
    PermissionRepository,
};
