use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use chrono::Utc;

use posguard_application::GrantOverrideInput;
use posguard_domain::{OverrideEffect, OverrideId, PermissionId, UserId};

use crate::dto::{CreateOverrideRequest, OverrideResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_overrides_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<OverrideResponse>>> {
    let now = Utc::now();
    let overrides = state
        .permission_override_service
        .list_overrides(user, UserId::new(user_id))
        .await?
        .iter()
        .map(|value| OverrideResponse::from_override(value, now))
        .collect();

    Ok(Json(overrides))
}

pub async fn create_override_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    Path(user_id): Path<i64>,
    Json(payload): Json<CreateOverrideRequest>,
) -> ApiResult<(StatusCode, Json<OverrideResponse>)> {
    let effect = OverrideEffect::from_str(payload.effect.as_str())?;

    let created = state
        .permission_override_service
        .grant_override(
            user,
            GrantOverrideInput {
                user_id: UserId::new(user_id),
                permission_id: PermissionId::new(payload.permission_id),
                effect,
                valid_from: payload.valid_from,
                valid_to: payload.valid_to,
                reason: payload.reason,
            },
        )
        .await?;

    tracing::info!(
        actor = %user,
        user_id,
        override_id = %created.id(),
        effect = effect.as_str(),
        "permission override granted"
    );

    Ok((
        StatusCode::CREATED,
        Json(OverrideResponse::from_override(&created, Utc::now())),
    ))
}

pub async fn revoke_override_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserId>,
    Path(override_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let revoked = state
        .permission_override_service
        .revoke_override(user, OverrideId::new(override_id))
        .await?;

    tracing::info!(
        actor = %user,
        override_id,
        user_id = %revoked.user_id(),
        "permission override revoked"
    );

    Ok(StatusCode::NO_CONTENT)
}
