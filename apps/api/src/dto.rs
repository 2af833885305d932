use chrono::{DateTime, Utc};
use posguard_application::ScreenAccess;
use posguard_domain::{
    CompositeOperation, Operation, Screen, ScreenKind, UserPermissionOverride,
    is_restricted_screen,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Catalog entry for a base or composite operation.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct OperationResponse {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub is_composite: bool,
}

impl From<Operation> for OperationResponse {
    fn from(value: Operation) -> Self {
        Self {
            name: value.as_str(),
            display_name: value.display_name(),
            description: value.description(),
            is_composite: false,
        }
    }
}

impl From<CompositeOperation> for OperationResponse {
    fn from(value: CompositeOperation) -> Self {
        Self {
            name: value.as_str(),
            display_name: value.display_name(),
            description: value.description(),
            is_composite: true,
        }
    }
}

/// Catalog entry for a screen.
#[derive(Debug, Serialize)]
pub struct ScreenResponse {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub kind: ScreenKind,
    pub is_restricted: bool,
}

impl From<Screen> for ScreenResponse {
    fn from(value: Screen) -> Self {
        Self {
            name: value.as_str(),
            display_name: value.display_name(),
            description: value.description(),
            kind: value.kind(),
            is_restricted: is_restricted_screen(value),
        }
    }
}

/// Incoming payload for the operations available across a screen selection.
#[derive(Debug, Deserialize)]
pub struct AvailableOperationsRequest {
    #[serde(default)]
    pub screens: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AvailableOperationsResponse {
    pub operations: Vec<&'static str>,
}

impl From<Vec<Operation>> for AvailableOperationsResponse {
    fn from(value: Vec<Operation>) -> Self {
        Self {
            operations: value.iter().map(Operation::as_str).collect(),
        }
    }
}

/// Caller's access summary for one screen.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ScreenAccessResponse {
    pub screen: &'static str,
    pub operations: Vec<&'static str>,
    pub has_full_access: bool,
    pub has_view_only_access: bool,
    pub has_any_permission: bool,
}

impl From<ScreenAccess> for ScreenAccessResponse {
    fn from(value: ScreenAccess) -> Self {
        Self {
            screen: value.screen.as_str(),
            operations: value.operations.iter().map(Operation::as_str).collect(),
            has_full_access: value.has_full_access,
            has_view_only_access: value.has_view_only_access,
            has_any_permission: value.has_any_permission,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct AccessCheckQuery {
    pub screen: Option<String>,
    pub operation: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AccessCheckResponse {
    pub allowed: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct InvalidateCacheResponse {
    pub invalidated: bool,
}

/// Incoming payload for recording a user override.
#[derive(Debug, Deserialize)]
pub struct CreateOverrideRequest {
    pub permission_id: i64,
    pub effect: String,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

/// API representation of a user override.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct OverrideResponse {
    pub override_id: i64,
    pub user_id: i64,
    pub permission_id: i64,
    pub effect: &'static str,
    pub valid_from: Option<String>,
    pub valid_to: Option<String>,
    pub reason: Option<String>,
    pub created_at: String,
    pub revoked_at: Option<String>,
    pub is_active: bool,
}

impl OverrideResponse {
    pub fn from_override(value: &UserPermissionOverride, now: DateTime<Utc>) -> Self {
        let window = value.window();
        Self {
            override_id: value.id().as_i64(),
            user_id: value.user_id().as_i64(),
            permission_id: value.permission_id().as_i64(),
            effect: value.effect().as_str(),
            valid_from: window.valid_from().map(|at| at.to_rfc3339()),
            valid_to: window.valid_to().map(|at| at.to_rfc3339()),
            reason: value.reason().map(str::to_owned),
            created_at: value.created_at().to_rfc3339(),
            revoked_at: value.revoked_at().map(|at| at.to_rfc3339()),
            is_active: value.is_active_at(now),
        }
    }
}
