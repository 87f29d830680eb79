//! Terminal display formatting
//!
//! Tables for lists, plain text for detail views. Nothing here touches
//! storage; callers pass in the data they want rendered.

pub mod bank;
pub mod duplicates;
pub mod expense;

pub use bank::{format_bank_feed, format_bank_txn_details, status_icon};
pub use duplicates::format_duplicate_groups;
pub use expense::{format_expense_details, format_expense_table};
