//! Storage layer
//!
//! JSON file storage with atomic writes and automatic directory creation.
//! The repositories hold the persistent state; `load_ledger`/`store_ledger`
//! bridge between them and the in-memory [`Ledger`](crate::ledger::Ledger)
//! snapshot the reconciliation core works on.

pub mod bank_txns;
pub mod expenses;
pub mod file_io;
pub mod vehicles;

pub use bank_txns::BankTxnRepository;
pub use expenses::ExpenseRepository;
pub use file_io::{read_json, write_json_atomic};
pub use vehicles::VehicleRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::FleetPaths;
use crate::error::LedgerError;
use crate::ledger::Ledger;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: FleetPaths,
    audit: AuditLogger,
    pub expenses: ExpenseRepository,
    pub bank_txns: BankTxnRepository,
    pub vehicles: VehicleRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: FleetPaths) -> Result<Self, LedgerError> {
        paths.ensure_directories()?;

        Ok(Self {
            expenses: ExpenseRepository::new(paths.expenses_file()),
            bank_txns: BankTxnRepository::new(paths.bank_txns_file()),
            vehicles: VehicleRepository::new(paths.vehicles_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &FleetPaths {
        &self.paths
    }

    /// Get the audit logger
    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), LedgerError> {
        self.expenses.load()?;
        self.bank_txns.load()?;
        self.vehicles.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), LedgerError> {
        self.expenses.save()?;
        self.bank_txns.save()?;
        self.vehicles.save()?;
        Ok(())
    }

    /// Check if storage has been initialized (has any data)
    pub fn is_initialized(&self) -> bool {
        self.paths.settings_file().exists()
    }

    /// Build an in-memory ledger snapshot from the loaded repositories
    pub fn load_ledger(&self) -> Result<Ledger, LedgerError> {
        Ok(Ledger {
            expenses: self.expenses.get_all()?,
            bank_txns: self.bank_txns.get_all()?,
        })
    }

    /// Write a ledger snapshot back through the repositories and persist
    pub fn store_ledger(&self, ledger: &Ledger) -> Result<(), LedgerError> {
        self.expenses.replace_all(ledger.expenses.clone())?;
        self.bank_txns.replace_all(ledger.bank_txns.clone())?;
        self.expenses.save()?;
        self.bank_txns.save()?;
        Ok(())
    }

    /// Audit a create operation
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), LedgerError> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    /// Audit an update operation
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Result<(), LedgerError> {
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
        ))
    }

    /// Audit a delete operation
    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), LedgerError> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }
}
