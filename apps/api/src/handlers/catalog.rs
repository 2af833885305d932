use std::str::FromStr;

use axum::Json;
use axum::extract::Path;

use posguard_domain::{
    CompositeOperation, Operation, ScreenScope, available_operations,
    available_operations_for_screens, list_operations, list_screens,
};

use crate::dto::{
    AvailableOperationsRequest, AvailableOperationsResponse, OperationResponse, ScreenResponse,
};
use crate::error::ApiResult;

pub async fn list_operations_handler() -> Json<Vec<OperationResponse>> {
    let base = list_operations().iter().copied().map(OperationResponse::from);
    let composite = CompositeOperation::all()
        .iter()
        .copied()
        .map(OperationResponse::from);

    Json(base.chain(composite).collect())
}

pub async fn list_screens_handler() -> Json<Vec<ScreenResponse>> {
    Json(list_screens().iter().copied().map(ScreenResponse::from).collect())
}

pub async fn screen_operations_handler(
    Path(screen): Path<String>,
) -> ApiResult<Json<AvailableOperationsResponse>> {
    let operations = match ScreenScope::from_str(screen.as_str())? {
        ScreenScope::All => Operation::all(),
        ScreenScope::Only(screen) => available_operations(screen),
    };
    Ok(Json(operations.to_vec().into()))
}

pub async fn available_operations_handler(
    Json(payload): Json<AvailableOperationsRequest>,
) -> ApiResult<Json<AvailableOperationsResponse>> {
    let selection = payload
        .screens
        .iter()
        .map(|screen| ScreenScope::from_str(screen.as_str()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(available_operations_for_screens(&selection).into()))
}
