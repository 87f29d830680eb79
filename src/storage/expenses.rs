//! Expense repository for JSON storage
//!
//! Manages loading and saving expenses to expenses.json. Records keep their
//! file order in memory so scans and candidate lists come out the same way
//! every run.

use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{BankTxnId, Expense, ExpenseId, VehicleId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable expense data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExpenseData {
    expenses: Vec<Expense>,
}

/// Repository for expense persistence
pub struct ExpenseRepository {
    path: PathBuf,
    data: RwLock<Vec<Expense>>,
}

impl ExpenseRepository {
    /// Create a new expense repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Vec::new()),
        }
    }

    /// Load expenses from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: ExpenseData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire write lock: {}", e)))?;

        *data = file_data.expenses;
        Ok(())
    }

    /// Save expenses to disk in their in-memory order
    pub fn save(&self) -> Result<(), LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire read lock: {}", e)))?;

        let file_data = ExpenseData {
            expenses: data.clone(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    /// Get an expense by ID
    pub fn get(&self, id: ExpenseId) -> Result<Option<Expense>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire read lock: {}", e)))?;

        Ok(data.iter().find(|e| e.id == id).cloned())
    }

    /// Get all expenses in stored order
    pub fn get_all(&self) -> Result<Vec<Expense>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire read lock: {}", e)))?;

        Ok(data.clone())
    }

    /// Get expenses attributed to a vehicle
    pub fn get_by_vehicle(&self, vehicle_id: VehicleId) -> Result<Vec<Expense>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire read lock: {}", e)))?;

        Ok(data
            .iter()
            .filter(|e| e.vehicle_id == vehicle_id)
            .cloned()
            .collect())
    }

    /// Get expenses linked to a bank transaction
    pub fn get_by_bank_txn(&self, txn_id: BankTxnId) -> Result<Vec<Expense>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire read lock: {}", e)))?;

        Ok(data
            .iter()
            .filter(|e| e.linked_bank_txn_ids.contains(&txn_id))
            .cloned()
            .collect())
    }

    /// Insert or update an expense. New records append; existing records
    /// update in place, keeping their position.
    pub fn upsert(&self, expense: Expense) -> Result<(), LedgerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire write lock: {}", e)))?;

        match data.iter_mut().find(|e| e.id == expense.id) {
            Some(existing) => *existing = expense,
            None => data.push(expense),
        }
        Ok(())
    }

    /// Delete an expense, returning it if it existed
    pub fn delete(&self, id: ExpenseId) -> Result<Option<Expense>, LedgerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire write lock: {}", e)))?;

        let pos = data.iter().position(|e| e.id == id);
        Ok(pos.map(|p| data.remove(p)))
    }

    /// Replace the entire in-memory set (used when committing a ledger
    /// snapshot back to storage)
    pub fn replace_all(&self, expenses: Vec<Expense>) -> Result<(), LedgerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire write lock: {}", e)))?;

        *data = expenses;
        Ok(())
    }

    /// Number of stored expenses
    pub fn count(&self) -> Result<usize, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}
