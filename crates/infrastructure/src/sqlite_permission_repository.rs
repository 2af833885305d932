use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use posguard_application::{
    NewPermissionOverride, PermissionOverrideRepository, PermissionRepository,
};
use posguard_core::{AppError, AppResult};
use posguard_domain::{
    OperationToken, OverrideEffect, OverrideId, Permission, PermissionId, PermissionInput,
    ScreenScope, UserId, UserPermissionOverride, UserPermissionOverrideInput, ValidityWindow,
};

use sqlx::{FromRow, SqlitePool};

/// SQLite-backed repository for permission catalog, role grants and overrides.
#[derive(Clone)]
pub struct SqlitePermissionRepository {
    pool: SqlitePool,
}

impl SqlitePermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: i64,
    code: String,
    display_name: String,
    screen: Option<String>,
    operation: Option<String>,
    is_parent: bool,
    parent_permission_id: Option<i64>,
}

impl TryFrom<PermissionRow> for Permission {
    type Error = AppError;

    fn try_from(row: PermissionRow) -> Result<Self, Self::Error> {
        let screen = row
            .screen
            .as_deref()
            .map(ScreenScope::from_str)
            .transpose()?;
        let operation = row
            .operation
            .as_deref()
            .map(OperationToken::from_str)
            .transpose()?;

        Permission::new(PermissionInput {
            id: PermissionId::new(row.id),
            code: row.code,
            display_name: row.display_name,
            screen,
            operation,
            is_parent: row.is_parent,
            parent_permission_id: row.parent_permission_id.map(PermissionId::new),
        })
    }
}

/// Decodes a catalog row. Rows naming an unknown screen or operation are
/// skipped so they can never match a check.
fn decode_permission(row: PermissionRow) -> Option<Permission> {
    let id = row.id;
    let code = row.code.clone();

    match Permission::try_from(row) {
        Ok(permission) => Some(permission),
        Err(error) => {
            tracing::warn!(
                permission_id = id,
                code = %code,
                error = %error,
                "skipping undecodable permission row"
            );
            None
        }
    }
}

#[derive(Debug, FromRow)]
struct OverrideRow {
    id: i64,
    user_id: i64,
    permission_id: i64,
    is_allowed: bool,
    valid_from: Option<DateTime<Utc>>,
    valid_to: Option<DateTime<Utc>>,
    reason: Option<String>,
    created_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl TryFrom<OverrideRow> for UserPermissionOverride {
    type Error = AppError;

    fn try_from(row: OverrideRow) -> Result<Self, Self::Error> {
        let window = ValidityWindow::new(row.valid_from, row.valid_to).map_err(|error| {
            AppError::Internal(format!("failed to decode override '{}': {error}", row.id))
        })?;

        Ok(UserPermissionOverride::new(UserPermissionOverrideInput {
            id: OverrideId::new(row.id),
            user_id: UserId::new(row.user_id),
            permission_id: PermissionId::new(row.permission_id),
            effect: OverrideEffect::from_is_allowed(row.is_allowed),
            window,
            reason: row.reason,
            created_at: row.created_at,
            revoked_at: row.revoked_at,
        }))
    }
}

const OVERRIDE_COLUMNS: &str = r#"
    id, user_id, permission_id, is_allowed, valid_from, valid_to, reason, created_at, revoked_at
"#;

#[async_trait]
impl PermissionRepository for SqlitePermissionRepository {
    async fn list_role_permission_ids(&self, user_id: UserId) -> AppResult<Vec<PermissionId>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT DISTINCT role_permissions.permission_id
            FROM user_roles
            INNER JOIN roles
                ON roles.id = user_roles.role_id
            INNER JOIN role_permissions
                ON role_permissions.role_id = roles.id
            WHERE user_roles.user_id = ?
                AND roles.is_active = 1
            ORDER BY role_permissions.permission_id
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load role permissions for user '{user_id}': {error}"
            ))
        })?;

        Ok(ids.into_iter().map(PermissionId::new).collect())
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, code, display_name, screen, operation, is_parent, parent_permission_id
            FROM permissions
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load permissions: {error}")))?;

        Ok(rows.into_iter().filter_map(decode_permission).collect())
    }

    async fn list_overrides_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        let rows = sqlx::query_as::<_, OverrideRow>(&format!(
            "SELECT {OVERRIDE_COLUMNS} FROM user_permission_overrides WHERE user_id = ? ORDER BY id"
        ))
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load overrides for user '{user_id}': {error}"
            ))
        })?;

        rows.into_iter().map(UserPermissionOverride::try_from).collect()
    }
}

#[async_trait]
impl PermissionOverrideRepository for SqlitePermissionRepository {
    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, code, display_name, screen, operation, is_parent, parent_permission_id
            FROM permissions
            WHERE id = ?
            "#,
        )
        .bind(permission_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load permission '{permission_id}': {error}"
            ))
        })?;

        Ok(row.and_then(decode_permission))
    }

    async fn create_override(
        &self,
        input: NewPermissionOverride,
    ) -> AppResult<UserPermissionOverride> {
        let row = sqlx::query_as::<_, OverrideRow>(&format!(
            r#"
            INSERT INTO user_permission_overrides
                (user_id, permission_id, is_allowed, valid_from, valid_to, reason, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {OVERRIDE_COLUMNS}
            "#
        ))
        .bind(input.user_id.as_i64())
        .bind(input.permission_id.as_i64())
        .bind(input.effect.is_allowed())
        .bind(input.window.valid_from())
        .bind(input.window.valid_to())
        .bind(input.reason.as_deref())
        .bind(input.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to create override for user '{}': {error}",
                input.user_id
            ))
        })?;

        let created = UserPermissionOverride::try_from(row)?;
        tracing::info!(
            override_id = %created.id(),
            user_id = %created.user_id(),
            permission_id = %created.permission_id(),
            effect = created.effect().as_str(),
            "permission override created"
        );

        Ok(created)
    }

    async fn find_override(
        &self,
        override_id: OverrideId,
    ) -> AppResult<Option<UserPermissionOverride>> {
        let row = sqlx::query_as::<_, OverrideRow>(&format!(
            "SELECT {OVERRIDE_COLUMNS} FROM user_permission_overrides WHERE id = ?"
        ))
        .bind(override_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load override '{override_id}': {error}"))
        })?;

        row.map(UserPermissionOverride::try_from).transpose()
    }

    async fn revoke_override(
        &self,
        override_id: OverrideId,
        revoked_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE user_permission_overrides
            SET revoked_at = ?
            WHERE id = ?
                AND revoked_at IS NULL
            "#,
        )
        .bind(revoked_at)
        .bind(override_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to revoke override '{override_id}': {error}"))
        })?;

        if result.rows_affected() == 0 {
            return match self.find_override(override_id).await? {
                Some(_) => Err(AppError::Conflict(format!(
                    "override '{override_id}' is already revoked"
                ))),
                None => Err(AppError::NotFound(format!(
                    "override '{override_id}' does not exist"
                ))),
            };
        }

        tracing::info!(override_id = %override_id, "permission override revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
