use std::sync::Arc;

use chrono::{DateTime, Utc};
use posguard_core::{AppError, AppResult};
use posguard_domain::{
    Operation, OverrideEffect, OverrideId, PermissionId, Screen, UserId, UserPermissionOverride,
    ValidityWindow,
};

use crate::{
    AccessControlService, NewPermissionOverride, PermissionOverrideRepository,
    PermissionRepository,
};

/// Input for granting or denying one permission to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantOverrideInput {
    /// Target user.
    pub user_id: UserId,
    /// Overridden permission.
    pub permission_id: PermissionId,
    /// Allow or deny.
    pub effect: OverrideEffect,
    /// Start of validity, unbounded when absent.
    pub valid_from: Option<DateTime<Utc>>,
    /// End of validity, unbounded when absent.
    pub valid_to: Option<DateTime<Utc>>,
    /// Administrator's reason.
    pub reason: Option<String>,
}

/// Application service for per-user override administration.
#[derive(Clone)]
pub struct PermissionOverrideService {
    access_control: AccessControlService,
    override_repository: Arc<dyn PermissionOverrideRepository>,
    permission_repository: Arc<dyn PermissionRepository>,
}

impl PermissionOverrideService {
    /// Creates a new override service.
    #[must_use]
    pub fn new(
        access_control: AccessControlService,
        override_repository: Arc<dyn PermissionOverrideRepository>,
        permission_repository: Arc<dyn PermissionRepository>,
    ) -> Self {
        Self {
            access_control,
            override_repository,
            permission_repository,
        }
    }

    /// Records an override and invalidates the target user's cache.
    pub async fn grant_override(
        &self,
        actor: UserId,
        input: GrantOverrideInput,
    ) -> AppResult<UserPermissionOverride> {
        self.grant_override_at(actor, input, Utc::now()).await
    }

    /// Same as [`Self::grant_override`] with an explicit clock.
    pub async fn grant_override_at(
        &self,
        actor: UserId,
        input: GrantOverrideInput,
        now: DateTime<Utc>,
    ) -> AppResult<UserPermissionOverride> {
        self.require_manage(actor, Operation::Update).await?;

        let window = ValidityWindow::new(input.valid_from, input.valid_to)?;
        if self
            .override_repository
            .find_permission(input.permission_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "permission '{}' does not exist",
                input.permission_id
            )));
        }

        let created = self
            .override_repository
            .create_override(NewPermissionOverride {
                user_id: input.user_id,
                permission_id: input.permission_id,
                effect: input.effect,
                window,
                reason: input.reason,
                created_at: now,
            })
            .await?;

        self.access_control.invalidate(input.user_id).await?;
        Ok(created)
    }

    /// Marks an override revoked and invalidates the owner's cache.
    pub async fn revoke_override(
        &self,
        actor: UserId,
        override_id: OverrideId,
    ) -> AppResult<UserPermissionOverride> {
        self.revoke_override_at(actor, override_id, Utc::now()).await
    }

    /// Same as [`Self::revoke_override`] with an explicit clock.
    pub async fn revoke_override_at(
        &self,
        actor: UserId,
        override_id: OverrideId,
        now: DateTime<Utc>,
    ) -> AppResult<UserPermissionOverride> {
        self.require_manage(actor, Operation::Delete).await?;

        let existing = self
            .override_repository
            .find_override(override_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("override '{override_id}' does not exist")))?;

        if existing.revoked_at().is_some() {
            return Err(AppError::Conflict(format!(
                "override '{override_id}' is already revoked"
            )));
        }

        self.override_repository
            .revoke_override(override_id, now)
            .await?;
        self.access_control.invalidate(existing.user_id()).await?;

        self.override_repository
            .find_override(override_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("override '{override_id}' does not exist")))
    }

    /// Lists every override recorded for a user.
    pub async fn list_overrides(
        &self,
        actor: UserId,
        user_id: UserId,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        self.require_manage(actor, Operation::View).await?;

        self.permission_repository
            .list_overrides_for_user(user_id)
            .await
    }

    async fn require_manage(&self, actor: UserId, operation: Operation) -> AppResult<()> {
        self.access_control
            .require_screen_operation(actor, Screen::PermissionManagement, operation)
            .await
    }
}
