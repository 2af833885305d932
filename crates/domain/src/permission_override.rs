use std::str::FromStr;

use chrono::{DateTime, Utc};
use posguard_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::ids::{OverrideId, PermissionId, UserId};

/// Direction of a per-user override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideEffect {
    /// Adds the permission on top of role grants.
    Allow,
    /// Removes the permission regardless of how it was granted.
    Deny,
}

impl OverrideEffect {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }

    /// Builds the effect from the stored allow flag.
    #[must_use]
    pub fn from_is_allowed(is_allowed: bool) -> Self {
        if is_allowed { Self::Allow } else { Self::Deny }
    }

    /// Returns the stored allow flag.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl FromStr for OverrideEffect {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "deny" => Ok(Self::Deny),
            _ => Err(AppError::Validation(format!(
                "unknown override effect '{value}'"
            ))),
        }
    }
}

/// Optional validity window of an override. Open ends are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidityWindow {
    valid_from: Option<DateTime<Utc>>,
    valid_to: Option<DateTime<Utc>>,
}

impl ValidityWindow {
    /// Creates a window, rejecting one that ends before it starts.
    pub fn new(
        valid_from: Option<DateTime<Utc>>,
        valid_to: Option<DateTime<Utc>>,
    ) -> AppResult<Self> {
        if let (Some(from), Some(to)) = (valid_from, valid_to) {
            if from > to {
                return Err(AppError::Validation(format!(
                    "override window starts at '{}' after it ends at '{}'",
                    from.to_rfc3339(),
                    to.to_rfc3339()
                )));
            }
        }

        Ok(Self {
            valid_from,
            valid_to,
        })
    }

    /// A window without bounds.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Returns the inclusive start.
    #[must_use]
    pub fn valid_from(&self) -> Option<DateTime<Utc>> {
        self.valid_from
    }

    /// Returns the inclusive end.
    #[must_use]
    pub fn valid_to(&self) -> Option<DateTime<Utc>> {
        self.valid_to
    }

    /// Returns whether `at` falls inside `[valid_from, valid_to]`.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.valid_from.is_none_or(|from| from <= at) && self.valid_to.is_none_or(|to| at <= to)
    }
}

/// Input payload for [`UserPermissionOverride::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPermissionOverrideInput {
    /// Stored identifier.
    pub id: OverrideId,
    /// User the override applies to.
    pub user_id: UserId,
    /// Overridden permission.
    pub permission_id: PermissionId,
    /// Allow or deny.
    pub effect: OverrideEffect,
    /// Validity window.
    pub window: ValidityWindow,
    /// Free-form reason recorded by the administrator.
    pub reason: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Revocation timestamp, if revoked.
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Per-user allow/deny adjustment layered on top of role grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermissionOverride {
    id: OverrideId,
    user_id: UserId,
    permission_id: PermissionId,
    effect: OverrideEffect,
    window: ValidityWindow,
    reason: Option<String>,
    created_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl UserPermissionOverride {
    /// Creates an override from persisted or validated input.
    #[must_use]
    pub fn new(input: UserPermissionOverrideInput) -> Self {
        Self {
            id: input.id,
            user_id: input.user_id,
            permission_id: input.permission_id,
            effect: input.effect,
            window: input.window,
            reason: input
                .reason
                .map(|reason| reason.trim().to_owned())
                .filter(|reason| !reason.is_empty()),
            created_at: input.created_at,
            revoked_at: input.revoked_at,
        }
    }

    /// Returns the stored identifier.
    #[must_use]
    pub fn id(&self) -> OverrideId {
        self.id
    }

    /// Returns the user the override applies to.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the overridden permission.
    #[must_use]
    pub fn permission_id(&self) -> PermissionId {
        self.permission_id
    }

    /// Returns allow or deny.
    #[must_use]
    pub fn effect(&self) -> OverrideEffect {
        self.effect
    }

    /// Returns the validity window.
    #[must_use]
    pub fn window(&self) -> ValidityWindow {
        self.window
    }

    /// Returns the administrator's reason.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the revocation timestamp.
    #[must_use]
    pub fn revoked_at(&self) -> Option<DateTime<Utc>> {
        self.revoked_at
    }

    /// Returns whether the override applies at `at`.
    #[must_use]
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.revoked_at.is_none_or(|revoked_at| at < revoked_at) && self.window.contains(at)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn at_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn deny_override(window: ValidityWindow) -> UserPermissionOverride {
        UserPermissionOverride::new(UserPermissionOverrideInput {
            id: OverrideId::new(1),
            user_id: UserId::new(7),
            permission_id: PermissionId::new(3),
            effect: OverrideEffect::Deny,
            window,
            reason: Some("  ".to_owned()),
            created_at: at_noon() - Duration::days(2),
            revoked_at: None,
        })
    }

    #[test]
    fn window_rejects_inverted_bounds() {
        let now = at_noon();
        assert!(ValidityWindow::new(Some(now), Some(now - Duration::hours(1))).is_err());
        assert!(ValidityWindow::new(Some(now), Some(now)).is_ok());
    }

    #[test]
    fn override_is_active_inside_its_window() {
        let now = at_noon();
        let window =
            ValidityWindow::new(Some(now - Duration::days(1)), Some(now + Duration::days(1)));
        let value = deny_override(window.unwrap_or_default());
        assert!(value.is_active_at(now));
        assert!(!value.is_active_at(now + Duration::days(2)));
        assert!(!value.is_active_at(now - Duration::days(2)));
    }

    #[test]
    fn expired_override_is_inactive() {
        let now = at_noon();
        let window = ValidityWindow::new(None, Some(now - Duration::days(1)));
        let value = deny_override(window.unwrap_or_default());
        assert!(!value.is_active_at(now));
    }

    #[test]
    fn unbounded_window_is_always_active() {
        let value = deny_override(ValidityWindow::unbounded());
        assert!(value.is_active_at(at_noon()));
        assert_eq!(value.reason(), None);
    }

    #[test]
    fn revoked_override_stops_applying() {
        let now = at_noon();
        let mut input = UserPermissionOverrideInput {
            id: OverrideId::new(2),
            user_id: UserId::new(7),
            permission_id: PermissionId::new(3),
            effect: OverrideEffect::Allow,
            window: ValidityWindow::unbounded(),
            reason: None,
            created_at: now - Duration::days(3),
            revoked_at: None,
        };
        input.revoked_at = Some(now - Duration::hours(1));
        let value = UserPermissionOverride::new(input);
        assert!(!value.is_active_at(now));
        assert!(value.is_active_at(now - Duration::hours(2)));
    }

    #[test]
    fn effect_parses_and_maps_allow_flag() {
        assert_eq!(OverrideEffect::from_str("DENY").ok(), Some(OverrideEffect::Deny));
        assert_eq!(OverrideEffect::from_is_allowed(true), OverrideEffect::Allow);
        assert!(!OverrideEffect::Deny.is_allowed());
        assert!(OverrideEffect::from_str("maybe").is_err());
    }
}
