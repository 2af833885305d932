use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use posguard_core::{AppError, AppResult};
use posguard_domain::{
    Operation, OperationToken, OverrideEffect, OverrideId, Permission, PermissionId,
    PermissionInput, Screen, ScreenScope, UserId, UserPermissionOverride,
    UserPermissionOverrideInput, ValidityWindow,
};
use tokio::sync::{Mutex, Notify};

use crate::{
    NewPermissionOverride, PermissionCacheStore, PermissionOverrideRepository,
    PermissionRepository, UserPermissionCache,
};

pub(crate) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0)
        .single()
        .unwrap_or_default()
}

pub(crate) fn permission(
    id: i64,
    code: &str,
    screen: ScreenScope,
    operation: OperationToken,
) -> Permission {
    match Permission::new(PermissionInput {
        id: PermissionId::new(id),
        code: code.to_owned(),
        display_name: String::new(),
        screen: Some(screen),
        operation: Some(operation),
        is_parent: false,
        parent_permission_id: None,
    }) {
        Ok(permission) => permission,
        Err(error) => panic!("invalid test permission '{code}': {error}"),
    }
}

pub(crate) fn grant(id: i64, screen: Screen, operation: Operation) -> Permission {
    permission(
        id,
        &format!("{}.{}", screen.as_str(), operation.as_str()),
        ScreenScope::Only(screen),
        OperationToken::Base(operation),
    )
}

pub(crate) fn override_for(
    id: i64,
    user_id: UserId,
    permission_id: i64,
    effect: OverrideEffect,
    valid_from: Option<DateTime<Utc>>,
    valid_to: Option<DateTime<Utc>>,
) -> UserPermissionOverride {
    let window = match ValidityWindow::new(valid_from, valid_to) {
        Ok(window) => window,
        Err(error) => panic!("invalid test window: {error}"),
    };

    UserPermissionOverride::new(UserPermissionOverrideInput {
        id: OverrideId::new(id),
        user_id,
        permission_id: PermissionId::new(permission_id),
        effect,
        window,
        reason: None,
        created_at: fixed_now() - Duration::days(7),
        revoked_at: None,
    })
}

#[derive(Default)]
pub(crate) struct FakePermissionRepository {
    pub catalog: Mutex<Vec<Permission>>,
    pub role_grants: Mutex<HashMap<UserId, Vec<PermissionId>>>,
    pub overrides: Mutex<Vec<UserPermissionOverride>>,
    pub fail_reads: Mutex<bool>,
    pub catalog_reads: Mutex<usize>,
}

impl FakePermissionRepository {
    pub(crate) fn with_catalog(catalog: Vec<Permission>) -> Self {
        Self {
            catalog: Mutex::new(catalog),
            ..Self::default()
        }
    }

    pub(crate) async fn assign(&self, user_id: UserId, permission_ids: &[i64]) {
        self.role_grants.lock().await.insert(
            user_id,
            permission_ids.iter().copied().map(PermissionId::new).collect(),
        );
    }

    pub(crate) async fn add_override(&self, value: UserPermissionOverride) {
        self.overrides.lock().await.push(value);
    }

    async fn ensure_available(&self) -> AppResult<()> {
        if *self.fail_reads.lock().await {
            return Err(AppError::Internal("permission store unavailable".to_owned()));
        }

        Ok(())
    }
}

#[async_trait]
impl PermissionRepository for FakePermissionRepository {
    async fn list_role_permission_ids(&self, user_id: UserId) -> AppResult<Vec<PermissionId>> {
        self.ensure_available().await?;
        Ok(self
            .role_grants
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.ensure_available().await?;
        *self.catalog_reads.lock().await += 1;
        Ok(self.catalog.lock().await.clone())
    }

    async fn list_overrides_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        self.ensure_available().await?;
        Ok(self
            .overrides
            .lock()
            .await
            .iter()
            .filter(|value| value.user_id() == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PermissionOverrideRepository for FakePermissionRepository {
    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        Ok(self
            .catalog
            .lock()
            .await
            .iter()
            .find(|permission| permission.id() == permission_id)
            .cloned())
    }

    async fn create_override(
        &self,
        input: NewPermissionOverride,
    ) -> AppResult<UserPermissionOverride> {
        let mut overrides = self.overrides.lock().await;
        let next_id = overrides
            .iter()
            .map(|value| value.id().as_i64())
            .max()
            .unwrap_or(0)
            + 1;
        let value = UserPermissionOverride::new(UserPermissionOverrideInput {
            id: OverrideId::new(next_id),
            user_id: input.user_id,
            permission_id: input.permission_id,
            effect: input.effect,
            window: input.window,
            reason: input.reason,
            created_at: input.created_at,
            revoked_at: None,
        });
        overrides.push(value.clone());
        Ok(value)
    }

    async fn find_override(
        &self,
        override_id: OverrideId,
    ) -> AppResult<Option<UserPermissionOverride>> {
        Ok(self
            .overrides
            .lock()
            .await
            .iter()
            .find(|value| value.id() == override_id)
            .cloned())
    }

    async fn revoke_override(
        &self,
        override_id: OverrideId,
        revoked_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut overrides = self.overrides.lock().await;
        let Some(position) = overrides.iter().position(|value| value.id() == override_id) else {
            return Err(AppError::NotFound(format!(
                "override '{override_id}' does not exist"
            )));
        };

        let current = overrides[position].clone();
        overrides[position] = UserPermissionOverride::new(UserPermissionOverrideInput {
            id: current.id(),
            user_id: current.user_id(),
            permission_id: current.permission_id(),
            effect: current.effect(),
            window: current.window(),
            reason: current.reason().map(str::to_owned),
            created_at: current.created_at(),
            revoked_at: Some(revoked_at),
        });
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeCacheStore {
    entries: Mutex<HashMap<UserId, Arc<UserPermissionCache>>>,
    generations: Mutex<HashMap<UserId, u64>>,
}

#[async_trait]
impl PermissionCacheStore for FakeCacheStore {
    async fn get(&self, user_id: UserId) -> AppResult<Option<Arc<UserPermissionCache>>> {
        Ok(self.entries.lock().await.get(&user_id).cloned())
    }

    async fn generation(&self, user_id: UserId) -> AppResult<u64> {
        Ok(self
            .generations
            .lock()
            .await
            .get(&user_id)
            .copied()
            .unwrap_or_default())
    }

    async fn put(&self, cache: Arc<UserPermissionCache>, generation: u64) -> AppResult<bool> {
        let generations = self.generations.lock().await;
        let current = generations.get(&cache.user_id()).copied().unwrap_or_default();
        if current != generation {
            return Ok(false);
        }

        self.entries.lock().await.insert(cache.user_id(), cache);
        Ok(true)
    }

    async fn remove(&self, user_id: UserId) -> AppResult<bool> {
        let mut generations = self.generations.lock().await;
        *generations.entry(user_id).or_default() += 1;
        Ok(self.entries.lock().await.remove(&user_id).is_some())
    }
}

/// Repository wrapper that parks the first override read until released.
pub(crate) struct GatedPermissionRepository {
    inner: Arc<FakePermissionRepository>,
    armed: AtomicBool,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedPermissionRepository {
    pub(crate) fn new(inner: Arc<FakePermissionRepository>) -> Self {
        Self {
            inner,
            armed: AtomicBool::new(true),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl PermissionRepository for GatedPermissionRepository {
    async fn list_role_permission_ids(&self, user_id: UserId) -> AppResult<Vec<PermissionId>> {
        self.inner.list_role_permission_ids(user_id).await
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.inner.list_permissions().await
    }

    async fn list_overrides_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        let overrides = self.inner.list_overrides_for_user(user_id).await?;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }

        Ok(overrides)
    }
}
