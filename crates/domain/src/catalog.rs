//! Token-level catalog lookups.
//!
//! Stored screen and operation values are plain strings, so every lookup here
//! is total: an unrecognised token never fails, display helpers echo it back
//! unchanged.

use std::str::FromStr;

use crate::operation::{ALL_OPERATIONS_SENTINEL, Operation, OperationToken};
use crate::screen::{ALL_SCREENS_SENTINEL, Screen, ScreenScope};

/// Returns the base operations in stable catalog order.
#[must_use]
pub fn list_operations() -> &'static [Operation] {
    Operation::all()
}

/// Returns every declared screen in stable catalog order.
#[must_use]
pub fn list_screens() -> &'static [Screen] {
    Screen::all()
}

/// Case-insensitive membership test against base, composite and wildcard operation tokens.
#[must_use]
pub fn is_valid_operation(token: &str) -> bool {
    OperationToken::from_str(token).is_ok()
}

/// Case-insensitive membership test against declared screens and the wildcard token.
#[must_use]
pub fn is_valid_screen(token: &str) -> bool {
    ScreenScope::from_str(token).is_ok()
}

/// Returns the label for an operation token, or the token itself when unknown.
#[must_use]
pub fn operation_display_name(token: &str) -> String {
    match OperationToken::from_str(token) {
        Ok(OperationToken::Any) => ALL_OPERATIONS_SENTINEL.to_owned(),
        Ok(OperationToken::Base(operation)) => operation.display_name().to_owned(),
        Ok(OperationToken::Composite(composite)) => composite.display_name().to_owned(),
        Err(_) => token.to_owned(),
    }
}

/// Returns the description for an operation token, or the token itself when unknown.
#[must_use]
pub fn operation_description(token: &str) -> String {
    match OperationToken::from_str(token) {
        Ok(OperationToken::Any) => "Every operation on the selected screens".to_owned(),
        Ok(OperationToken::Base(operation)) => operation.description().to_owned(),
        Ok(OperationToken::Composite(composite)) => composite.description().to_owned(),
        Err(_) => token.to_owned(),
    }
}

/// Returns the label for a screen token, or the token itself when unknown.
#[must_use]
pub fn screen_display_name(token: &str) -> String {
    match ScreenScope::from_str(token) {
        Ok(ScreenScope::All) => ALL_SCREENS_SENTINEL.to_owned(),
        Ok(ScreenScope::Only(screen)) => screen.display_name().to_owned(),
        Err(_) => token.to_owned(),
    }
}

/// Returns the description for a screen token, or the token itself when unknown.
#[must_use]
pub fn screen_description(token: &str) -> String {
    match ScreenScope::from_str(token) {
        Ok(ScreenScope::All) => "Every screen in the application".to_owned(),
        Ok(ScreenScope::Only(screen)) => screen.description().to_owned(),
        Err(_) => token.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn lists_eight_base_operations_in_stable_order() {
        let names: Vec<&str> = list_operations().iter().map(Operation::as_str).collect();
        assert_eq!(
            names,
            vec![
                "Create", "Read", "Update", "Delete", "View", "Export", "Import", "Print"
            ]
        );
    }

    #[test]
    fn special_tokens_are_valid_operations() {
        assert!(is_valid_operation("fullaccess"));
        assert!(is_valid_operation("ViewOnly"));
        assert!(is_valid_operation("NOACCESS"));
        assert!(is_valid_operation("-- All Operations --"));
        assert!(!is_valid_operation("Approve"));
    }

    #[test]
    fn wildcard_screen_is_valid() {
        assert!(is_valid_screen("-- All Screens --"));
        assert!(is_valid_screen("uom"));
        assert!(!is_valid_screen("Payroll"));
    }

    #[test]
    fn display_helpers_resolve_known_tokens() {
        assert_eq!(screen_display_name("grn"), "Goods Received Notes");
        assert_eq!(operation_display_name("viewonly"), "View Only");
        assert_eq!(operation_display_name("*"), ALL_OPERATIONS_SENTINEL);
        assert_eq!(screen_description("UOM"), "Manage units of measure");
    }

    proptest! {
        #[test]
        fn unknown_tokens_are_echoed_verbatim(token in "[a-z]{3,12}-[0-9]{1,3}") {
            prop_assert_eq!(operation_display_name(&token), token.clone());
            prop_assert_eq!(operation_description(&token), token.clone());
            prop_assert_eq!(screen_display_name(&token), token.clone());
            prop_assert_eq!(screen_description(&token), token.clone());
            prop_assert!(!is_valid_operation(&token));
            prop_assert!(!is_valid_screen(&token));
        }

        #[test]
        fn catalog_membership_ignores_case(index in 0usize..8, upper in any::<bool>()) {
            let name = list_operations()[index].as_str();
            let token = if upper { name.to_uppercase() } else { name.to_lowercase() };
            prop_assert!(is_valid_operation(&token));
        }
    }
}
