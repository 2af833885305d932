//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod catalog;
mod ids;
mod operation;
mod permission;
mod permission_override;
mod screen;
mod screen_policy;

pub use catalog::{
    is_valid_operation, is_valid_screen, list_operations, list_screens, operation_description,
    operation_display_name, screen_description, screen_display_name,
};
pub use ids::{OverrideId, PermissionId, UserId};
pub use operation::{
    ALL_OPERATIONS_SENTINEL, ALL_OPERATIONS_STORAGE_VALUE, CompositeOperation, Operation,
    OperationScope, OperationToken, is_all_operations_token,
};
pub use permission::{Permission, PermissionInput};
pub use permission_override::{
    OverrideEffect, UserPermissionOverride, UserPermissionOverrideInput, ValidityWindow,
};
pub use screen::{
    ALL_SCREENS_SENTINEL, ALL_SCREENS_STORAGE_VALUE, Screen, ScreenKind, ScreenScope,
    is_all_screens_token,
};
pub use screen_policy::{
    allows_operation, available_operations, available_operations_for_screens,
    is_operation_valid_for_screen, is_restricted_screen,
};
