use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};

use posguard_core::AppError;
use posguard_domain::{Operation, Screen, UserId};

use crate::dto::{
    AccessCheckQuery, AccessCheckResponse, InvalidateCacheResponse, ScreenAccessResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn screen_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    Path(screen): Path<String>,
) -> ApiResult<Json<ScreenAccessResponse>> {
    let screen = Screen::from_str(screen.as_str())?;
    let access = state
        .access_control_service
        .screen_access(user, screen)
        .await?;

    Ok(Json(access.into()))
}

/// Answers a single check. Unknown screen or operation tokens are denied.
pub async fn access_check_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    Query(query): Query<AccessCheckQuery>,
) -> ApiResult<Json<AccessCheckResponse>> {
    let cache = state.access_control_service.cache_for(user).await?;

    let allowed = match (&query.screen, &query.operation, &query.code) {
        (Some(screen), Some(operation), None) => cache.has_permission_tokens(screen, operation),
        (None, None, Some(code)) => cache.has_permission_code(code),
        _ => {
            return Err(AppError::Validation(
                "provide either screen and operation or code".to_owned(),
            )
            .into());
        }
    };

    if !allowed {
        tracing::debug!(
            user_id = %user,
            screen = query.screen.as_deref().unwrap_or_default(),
            operation = query.operation.as_deref().unwrap_or_default(),
            code = query.code.as_deref().unwrap_or_default(),
            "access check denied"
        );
    }

    Ok(Json(AccessCheckResponse { allowed }))
}

/// Drops a user's cache. Users may always drop their own.
pub async fn invalidate_cache_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<InvalidateCacheResponse>> {
    let target = UserId::new(user_id);
    if target != user {
        state
            .access_control_service
            .require_screen_operation(user, Screen::PermissionManagement, Operation::Update)
            .await?;
    }

    let invalidated = state.access_control_service.invalidate(target).await?;
    tracing::info!(actor = %user, user_id = %target, invalidated, "permission cache invalidated");

    Ok(Json(InvalidateCacheResponse { invalidated }))
}
