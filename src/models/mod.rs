mod contact;
mod expense;
mod inventory;
mod sale;
mod snapshot;
mod transaction;
mod user;
mod valuation;

pub use contact::{Contact, ContactType, ContactUpdate, NewContact};
pub use expense::{Expense, NewExpense, DEFAULT_EXPENSE_CATEGORIES};
pub use inventory::{
    BatchIntake, InventoryItem, InventoryStatus, InventoryUpdate, KNOWN_WOOD_TYPES,
};
pub use sale::{
    suggested_unit_price, NewSale, Sale, SaleSource, SaleStatus, SaleUpdate, DEFAULT_MARKUP,
};
pub use snapshot::Snapshot;
pub use transaction::{
    ReferenceType, TransactionKind, TransactionLog, PURCHASE_CATEGORY, SALES_CATEGORY,
};
pub use user::{NewUser, Permission, Role, User, UserStatus, UserUpdate, MIN_PASSWORD_LEN};
pub(crate) use user::validate_password;
pub use valuation::{
    allocate_batch_pricing, average_diameter, effective_length, gr_volume, gross_volume,
    net_volume, price_batch, BatchPricing, PricedLog, ValidationIssue, WoodLogMeasurement,
    WoodLogValuation, CROSS_SECTION_FACTOR, VOLUME_DIVISOR,
};
