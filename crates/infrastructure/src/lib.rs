//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_permission_cache_store;
mod in_memory_permission_repository;
mod sqlite_permission_repository;

pub use in_memory_permission_cache_store::InMemoryPermissionCacheStore;
pub use in_memory_permission_repository::InMemoryPermissionRepository;
pub use sqlite_permission_repository::SqlitePermissionRepository;
