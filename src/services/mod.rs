//! Service layer
//!
//! The reconciliation core (matcher, splitter, duplicates) operates on
//! in-memory [`Ledger`](crate::ledger::Ledger) snapshots and does no I/O.
//! The shell services (expense CRUD, feed import) sit on top of the storage
//! layer and handle validation, audit logging, and persistence.

pub mod duplicates;
pub mod expense;
pub mod import;
pub mod matcher;
pub mod splitter;

pub use duplicates::{DuplicateGroup, DuplicateScan, Signature};
pub use expense::{CreateExpenseInput, ExpenseFilter, ExpenseService, UpdateExpenseInput};
pub use import::{FeedMapping, ImportResult, ImportService, ImportStatus};
pub use matcher::{BulkOutcome, LinkOutcome};
pub use splitter::{LineUpdate, SplitSession, SplitState};
