use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use posguard_core::AppError;
use posguard_domain::UserId;

use crate::error::ApiResult;

/// Header carrying the signed-in user id, set by the upstream login layer.
pub const USER_ID_HEADER: &str = "x-posguard-user-id";

pub async fn require_user(mut request: Request, next: Next) -> ApiResult<Response> {
    let raw = request
        .headers()
        .get(USER_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized(format!("{USER_ID_HEADER} must be ASCII")))?;

    let user_id = parse_user_id(raw)?;
    request.extensions_mut().insert(user_id);
    Ok(next.run(request).await)
}

fn parse_user_id(raw: &str) -> Result<UserId, AppError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|value| *value > 0)
        .map(UserId::new)
        .ok_or_else(|| AppError::Unauthorized(format!("invalid user id '{raw}'")))
}
