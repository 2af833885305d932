use posguard_application::{AccessControlService, PermissionOverrideService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_control_service: AccessControlService,
    pub permission_override_service: PermissionOverrideService,
}
