//! Core data models for Fleet Ledger
//!
//! This module contains all the data structures that represent the ledger
//! domain: expenses, bank transactions, vehicles, money, and the category
//! taxonomy with its GST rate table.

pub mod bank;
pub mod expense;
pub mod ids;
pub mod money;
pub mod taxonomy;
pub mod vehicle;

pub use bank::{BankTransaction, BankTxnStatus};
pub use expense::{Expense, ExpenseValidationError, PaymentMethod, SPLIT_TAG};
pub use ids::{BankTxnId, ExpenseId, VehicleId};
pub use money::Money;
pub use taxonomy::{
    CategoryDef, ExpenseCategory, Taxonomy, TaxonomyValidationError, DEFAULT_GST_RATE, GST_SLABS,
};
pub use vehicle::{Vehicle, VehicleStatus};
