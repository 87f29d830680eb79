//! Custom error types for Fleet Ledger
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. Reconciliation failures get their own typed
//! error so callers can react to the exact imbalance or illegal transition.

use thiserror::Error;

use crate::models::{BankTxnStatus, Money};

/// Errors raised by the reconciliation core (matcher, splitter).
///
/// All of these are recoverable: the caller corrects the input and re-invokes.
/// There is no partial-commit state behind any of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationError {
    /// Split commit attempted while the lines do not sum to the transaction
    /// amount. Carries the exact unallocated remainder.
    #[error("split lines do not balance: unallocated remainder is {remainder}")]
    Imbalance { remainder: Money },

    /// Link/exclude attempted on a transaction outside the `Pending` state.
    #[error("illegal bank transaction state transition: {from} -> {to}")]
    InvalidTransition {
        from: BankTxnStatus,
        to: BankTxnStatus,
    },

    /// Attempt to remove the last remaining split line.
    #[error("a split must keep at least one line")]
    EmptySplit,
}

/// The main error type for Fleet Ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Reconciliation core errors (imbalance, illegal transition, empty split)
    #[error("Reconciliation error: {0}")]
    Reconciliation(#[from] ReconciliationError),

    /// Bank feed import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Create a "not found" error for expenses
    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for bank transactions
    pub fn bank_txn_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "BankTransaction",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for vehicles
    pub fn vehicle_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Vehicle",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a reconciliation error
    pub fn is_reconciliation(&self) -> bool {
        matches!(self, Self::Reconciliation(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Fleet Ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
