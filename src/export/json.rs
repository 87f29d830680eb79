//! JSON export functionality
//!
//! Exports the complete ledger to JSON with schema versioning.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{BankTransaction, Expense, Vehicle};
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full ledger export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    /// All vehicles
    pub vehicles: Vec<Vehicle>,

    /// All expenses
    pub expenses: Vec<Expense>,

    /// All bank transactions
    pub bank_txns: Vec<BankTransaction>,

    /// Export metadata
    pub metadata: ExportMetadata,
}

/// Export metadata for reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Total number of vehicles
    pub vehicle_count: usize,

    /// Total number of expenses
    pub expense_count: usize,

    /// Total number of bank transactions
    pub bank_txn_count: usize,

    /// Date of the earliest expense
    pub earliest_expense: Option<String>,

    /// Date of the latest expense
    pub latest_expense: Option<String>,
}

impl FullExport {
    /// Create a new full export from storage
    pub fn from_storage(storage: &Storage) -> LedgerResult<Self> {
        let vehicles = storage.vehicles.get_all()?;
        let expenses = storage.expenses.get_all()?;
        let bank_txns = storage.bank_txns.get_all()?;

        let earliest_expense = expenses.iter().map(|e| e.date).min().map(|d| d.to_string());
        let latest_expense = expenses.iter().map(|e| e.date).max().map(|d| d.to_string());

        let metadata = ExportMetadata {
            vehicle_count: vehicles.len(),
            expense_count: expenses.len(),
            bank_txn_count: bank_txns.len(),
            earliest_expense,
            latest_expense,
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            vehicles,
            expenses,
            bank_txns,
            metadata,
        })
    }
}

/// Export the full ledger to pretty-printed JSON
pub fn export_full_json<W: Write>(storage: &Storage, writer: &mut W) -> LedgerResult<()> {
    let export = FullExport::from_storage(storage)?;

    serde_json::to_writer_pretty(writer, &export)
        .map_err(|e| LedgerError::Export(e.to_string()))?;

    Ok(())
}
