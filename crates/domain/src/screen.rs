use std::fmt::{Display, Formatter};
use std::str::FromStr;

use posguard_core::AppError;
use serde::{Deserialize, Serialize};

/// Storage value used for the "all screens" wildcard.
pub const ALL_SCREENS_STORAGE_VALUE: &str = "*";

/// Display sentinel shown by selection lists for the "all screens" wildcard.
pub const ALL_SCREENS_SENTINEL: &str = "-- All Screens --";

/// Grouping of screens by their place in the application shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScreenKind {
    /// Top-level navigation destination.
    Navigation,
    /// Master-data or document management screen.
    Management,
    /// Tab inside another screen.
    SubModule,
    /// Settings page.
    Settings,
}

/// UI destinations subject to access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Screen {
    /// Landing dashboard.
    Dashboard,
    /// Checkout terminal.
    PointOfSale,
    /// Product list.
    Products,
    /// Stock overview.
    Inventory,
    /// Reservation list.
    Reservations,
    /// Sales and stock reports.
    Reports,
    /// User accounts.
    Users,
    /// Settings hub.
    Settings,
    /// Product categories.
    Category,
    /// Product brands.
    Brand,
    /// Units of measure.
    Uom,
    /// Suppliers.
    Supplier,
    /// Customers.
    Customer,
    /// Goods received notes.
    Grn,
    /// Stock adjustments.
    StockAdjustment,
    /// Transfers between locations.
    StockTransfer,
    /// Purchase orders.
    PurchaseOrder,
    /// Sales returns.
    SalesReturn,
    /// Discount rules.
    Discount,
    /// Tax rates.
    Tax,
    /// Pricing tab of a product.
    ProductPricing,
    /// Barcode tab of a product.
    ProductBarcodes,
    /// Calendar tab of reservations.
    ReservationCalendar,
    /// General settings page.
    GeneralSettings,
    /// Printer settings page.
    PrinterSettings,
    /// Language settings page.
    LanguageSettings,
    /// Backup settings page.
    BackupSettings,
    /// Role administration.
    RoleManagement,
    /// Permission and override administration.
    PermissionManagement,
}

impl Screen {
    /// Returns the stable storage value for this screen.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::PointOfSale => "PointOfSale",
            Self::Products => "Products",
            Self::Inventory => "Inventory",
            Self::Reservations => "Reservations",
            Self::Reports => "Reports",
            Self::Users => "Users",
            Self::Settings => "Settings",
            Self::Category => "Category",
            Self::Brand => "Brand",
            Self::Uom => "UOM",
            Self::Supplier => "Supplier",
            Self::Customer => "Customer",
            Self::Grn => "GRN",
            Self::StockAdjustment => "StockAdjustment",
            Self::StockTransfer => "StockTransfer",
            Self::PurchaseOrder => "PurchaseOrder",
            Self::SalesReturn => "SalesReturn",
            Self::Discount => "Discount",
            Self::Tax => "Tax",
            Self::ProductPricing => "ProductPricing",
            Self::ProductBarcodes => "ProductBarcodes",
            Self::ReservationCalendar => "ReservationCalendar",
            Self::GeneralSettings => "GeneralSettings",
            Self::PrinterSettings => "PrinterSettings",
            Self::LanguageSettings => "LanguageSettings",
            Self::BackupSettings => "BackupSettings",
            Self::RoleManagement => "RoleManagement",
            Self::PermissionManagement => "PermissionManagement",
        }
    }

    /// Returns all screens in catalog order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Screen] = &[
            Screen::Dashboard,
            Screen::PointOfSale,
            Screen::Products,
            Screen::Inventory,
            Screen::Reservations,
            Screen::Reports,
            Screen::Users,
            Screen::Settings,
            Screen::Category,
            Screen::Brand,
            Screen::Uom,
            Screen::Supplier,
            Screen::Customer,
            Screen::Grn,
            Screen::StockAdjustment,
            Screen::StockTransfer,
            Screen::PurchaseOrder,
            Screen::SalesReturn,
            Screen::Discount,
            Screen::Tax,
            Screen::ProductPricing,
            Screen::ProductBarcodes,
            Screen::ReservationCalendar,
            Screen::GeneralSettings,
            Screen::PrinterSettings,
            Screen::LanguageSettings,
            Screen::BackupSettings,
            Screen::RoleManagement,
            Screen::PermissionManagement,
        ];

        ALL
    }

    /// Returns where the screen lives in the application shell.
    #[must_use]
    pub fn kind(&self) -> ScreenKind {
        match self {
            Self::Dashboard
            | Self::PointOfSale
            | Self::Products
            | Self::Inventory
            | Self::Reservations
            | Self::Reports
            | Self::Users
            | Self::Settings => ScreenKind::Navigation,
            Self::ProductPricing | Self::ProductBarcodes | Self::ReservationCalendar => {
                ScreenKind::SubModule
            }
            Self::GeneralSettings
            | Self::PrinterSettings
            | Self::LanguageSettings
            | Self::BackupSettings
            | Self::RoleManagement
            | Self::PermissionManagement => ScreenKind::Settings,
            _ => ScreenKind::Management,
        }
    }

    /// Returns the human-readable label.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::PointOfSale => "Point of Sale",
            Self::Products => "Products",
            Self::Inventory => "Inventory",
            Self::Reservations => "Reservations",
            Self::Reports => "Reports",
            Self::Users => "Users",
            Self::Settings => "Settings",
            Self::Category => "Categories",
            Self::Brand => "Brands",
            Self::Uom => "Units of Measure",
            Self::Supplier => "Suppliers",
            Self::Customer => "Customers",
            Self::Grn => "Goods Received Notes",
            Self::StockAdjustment => "Stock Adjustments",
            Self::StockTransfer => "Stock Transfers",
            Self::PurchaseOrder => "Purchase Orders",
            Self::SalesReturn => "Sales Returns",
            Self::Discount => "Discounts",
            Self::Tax => "Taxes",
            Self::ProductPricing => "Product Pricing",
            Self::ProductBarcodes => "Product Barcodes",
            Self::ReservationCalendar => "Reservation Calendar",
            Self::GeneralSettings => "General Settings",
            Self::PrinterSettings => "Printer Settings",
            Self::LanguageSettings => "Language Settings",
            Self::BackupSettings => "Backup Settings",
            Self::RoleManagement => "Role Management",
            Self::PermissionManagement => "Permission Management",
        }
    }

    /// Returns a one-line description shown next to the screen in permission editors.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Dashboard => "Sales and stock overview",
            Self::PointOfSale => "Checkout terminal",
            Self::Products => "Product navigation area",
            Self::Inventory => "Stock navigation area",
            Self::Reservations => "Reservation navigation area",
            Self::Reports => "Sales, stock and audit reports",
            Self::Users => "User accounts navigation area",
            Self::Settings => "Settings navigation area",
            Self::Category => "Manage product categories",
            Self::Brand => "Manage product brands",
            Self::Uom => "Manage units of measure",
            Self::Supplier => "Manage suppliers",
            Self::Customer => "Manage customers",
            Self::Grn => "Record goods received from suppliers",
            Self::StockAdjustment => "Correct stock levels",
            Self::StockTransfer => "Move stock between locations",
            Self::PurchaseOrder => "Raise purchase orders",
            Self::SalesReturn => "Process returned sales",
            Self::Discount => "Manage discount rules",
            Self::Tax => "Manage tax rates",
            Self::ProductPricing => "Edit product price lists",
            Self::ProductBarcodes => "Print and assign barcodes",
            Self::ReservationCalendar => "Calendar view of reservations",
            Self::GeneralSettings => "Store-wide preferences",
            Self::PrinterSettings => "Receipt and label printers",
            Self::LanguageSettings => "Interface language",
            Self::BackupSettings => "Database backup and restore",
            Self::RoleManagement => "Define roles and their permissions",
            Self::PermissionManagement => "Grant per-user permission overrides",
        }
    }
}

impl Display for Screen {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Screen {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::all()
            .iter()
            .copied()
            .find(|screen| screen.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| AppError::Validation(format!("unknown screen '{value}'")))
    }
}

/// Screen slot of the permission index: one screen or the wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScreenScope {
    /// Every screen.
    All,
    /// One concrete screen.
    Only(Screen),
}

impl ScreenScope {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => ALL_SCREENS_STORAGE_VALUE,
            Self::Only(screen) => screen.as_str(),
        }
    }

    /// Returns true for the wildcard scope.
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl From<Screen> for ScreenScope {
    fn from(value: Screen) -> Self {
        Self::Only(value)
    }
}

impl Display for ScreenScope {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ScreenScope {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if is_all_screens_token(value) {
            return Ok(Self::All);
        }

        Screen::from_str(value).map(Self::Only)
    }
}

/// Returns whether the token is a form of the "all screens" wildcard.
#[must_use]
pub fn is_all_screens_token(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed == ALL_SCREENS_STORAGE_VALUE
        || trimmed.eq_ignore_ascii_case(ALL_SCREENS_SENTINEL)
        || trimmed.eq_ignore_ascii_case("AllScreens")
}
