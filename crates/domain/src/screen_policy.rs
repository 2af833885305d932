//! Static table of operations meaningful per screen.
//!
//! Only restricted screens have an entry. A screen missing from the table
//! accepts the full operation catalog.

use std::str::FromStr;

use crate::operation::Operation;
use crate::screen::{Screen, ScreenScope};

const VIEW: &[Operation] = &[Operation::View];
const MASTER_DATA: &[Operation] = &[
    Operation::Create,
    Operation::Read,
    Operation::Update,
    Operation::Delete,
    Operation::View,
];
const DOCUMENT: &[Operation] = &[
    Operation::Create,
    Operation::Read,
    Operation::Update,
    Operation::Delete,
    Operation::View,
    Operation::Export,
    Operation::Print,
];
const POSTED_DOCUMENT: &[Operation] = &[
    Operation::Create,
    Operation::Read,
    Operation::View,
    Operation::Print,
];
const EDITABLE_SETTINGS: &[Operation] = &[Operation::Update, Operation::View];

fn restricted_operations(screen: Screen) -> Option<&'static [Operation]> {
    let operations: &'static [Operation] = match screen {
        Screen::Dashboard
        | Screen::Products
        | Screen::Inventory
        | Screen::Reservations
        | Screen::Users
        | Screen::Settings => VIEW,
        Screen::PointOfSale => &[Operation::Create, Operation::View, Operation::Print],
        Screen::Reports => &[Operation::View, Operation::Export, Operation::Print],
        Screen::Category
        | Screen::Brand
        | Screen::Uom
        | Screen::Tax
        | Screen::Discount
        | Screen::RoleManagement
        | Screen::PermissionManagement => MASTER_DATA,
        Screen::Grn | Screen::PurchaseOrder => DOCUMENT,
        Screen::StockAdjustment | Screen::StockTransfer | Screen::SalesReturn => POSTED_DOCUMENT,
        Screen::ProductPricing => &[
            Operation::Read,
            Operation::Update,
            Operation::Export,
            Operation::Import,
        ],
        Screen::ProductBarcodes => &[Operation::View, Operation::Print],
        Screen::ReservationCalendar => &[Operation::Read, Operation::View],
        Screen::GeneralSettings | Screen::PrinterSettings | Screen::LanguageSettings => {
            EDITABLE_SETTINGS
        }
        Screen::BackupSettings => &[Operation::View, Operation::Export, Operation::Import],
        Screen::Supplier | Screen::Customer => return None,
    };

    Some(operations)
}

/// Returns the operations meaningful for a screen, in catalog order.
///
/// Screens without a table entry return the full catalog.
#[must_use]
pub fn available_operations(screen: Screen) -> &'static [Operation] {
    restricted_operations(screen).unwrap_or_else(Operation::all)
}

/// Returns whether a screen has an explicit entry in the policy table.
#[must_use]
pub fn is_restricted_screen(screen: Screen) -> bool {
    restricted_operations(screen).is_some()
}

/// Returns operations valid for every screen in the selection.
///
/// A selection containing the wildcard, or an empty selection, yields the
/// full catalog. Otherwise the result is the intersection of
/// [`available_operations`] across the screens, sorted by operation name.
#[must_use]
pub fn available_operations_for_screens(selection: &[ScreenScope]) -> Vec<Operation> {
    if selection.is_empty() || selection.iter().any(ScreenScope::is_all) {
        return Operation::all().to_vec();
    }

    let mut operations: Vec<Operation> = Operation::all()
        .iter()
        .copied()
        .filter(|operation| {
            selection.iter().all(|scope| match scope {
                ScreenScope::All => true,
                ScreenScope::Only(screen) => available_operations(*screen).contains(operation),
            })
        })
        .collect();
    operations.sort_by_key(Operation::as_str);
    operations
}

/// Returns whether an operation is meaningful for a screen.
#[must_use]
pub fn allows_operation(screen: Screen, operation: Operation) -> bool {
    available_operations(screen).contains(&operation)
}

/// Case-insensitive check on raw tokens.
///
/// Unknown screen tokens have no table entry and accept every catalog
/// operation; unknown operation tokens are never valid.
#[must_use]
pub fn is_operation_valid_for_screen(screen: &str, operation: &str) -> bool {
    let Ok(operation) = Operation::from_str(operation) else {
        return false;
    };

    match Screen::from_str(screen) {
        Ok(screen) => allows_operation(screen, operation),
        Err(_) => true,
    }
}
