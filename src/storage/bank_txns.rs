//! Bank transaction repository for JSON storage
//!
//! Manages loading and saving imported bank feed lines to bank_txns.json,
//! preserving import order.

use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{BankTransaction, BankTxnId, BankTxnStatus};

use super::file_io::{read_json, write_json_atomic};

/// Serializable bank transaction data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BankTxnData {
    transactions: Vec<BankTransaction>,
}

/// Repository for bank transaction persistence
pub struct BankTxnRepository {
    path: PathBuf,
    data: RwLock<Vec<BankTransaction>>,
}

impl BankTxnRepository {
    /// Create a new bank transaction repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Vec::new()),
        }
    }

    /// Load transactions from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: BankTxnData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire write lock: {}", e)))?;

        *data = file_data.transactions;
        Ok(())
    }

    /// Save transactions to disk in import order
    pub fn save(&self) -> Result<(), LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire read lock: {}", e)))?;

        let file_data = BankTxnData {
            transactions: data.clone(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    /// Get a transaction by ID
    pub fn get(&self, id: BankTxnId) -> Result<Option<BankTransaction>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire read lock: {}", e)))?;

        Ok(data.iter().find(|t| t.id == id).cloned())
    }

    /// Get all transactions in stored order
    pub fn get_all(&self) -> Result<Vec<BankTransaction>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire read lock: {}", e)))?;

        Ok(data.clone())
    }

    /// Get transactions in a given status
    pub fn get_by_status(&self, status: BankTxnStatus) -> Result<Vec<BankTransaction>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire read lock: {}", e)))?;

        Ok(data.iter().filter(|t| t.status == status).cloned().collect())
    }

    /// Insert or update a transaction, keeping existing positions
    pub fn upsert(&self, txn: BankTransaction) -> Result<(), LedgerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire write lock: {}", e)))?;

        match data.iter_mut().find(|t| t.id == txn.id) {
            Some(existing) => *existing = txn,
            None => data.push(txn),
        }
        Ok(())
    }

    /// Replace the entire in-memory set
    pub fn replace_all(&self, txns: Vec<BankTransaction>) -> Result<(), LedgerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire write lock: {}", e)))?;

        *data = txns;
        Ok(())
    }

    /// Number of stored transactions
    pub fn count(&self) -> Result<usize, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}
