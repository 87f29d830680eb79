//! Path management
//!
//! Resolves where ledger data, configuration, and the audit log live.
//!
//! ## Path Resolution Order
//!
//! 1. `FLEET_LEDGER_DATA_DIR` environment variable (if set)
//! 2. The platform config directory via `directories::ProjectDirs`
//!    (Linux: `~/.config/fleet-ledger`, macOS: `~/Library/Application
//!    Support/fleet-ledger`, Windows: `%APPDATA%\fleet-ledger`)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::LedgerError;

/// Manages all paths used by the ledger
#[derive(Debug, Clone)]
pub struct FleetPaths {
    /// Base directory for all ledger data
    base_dir: PathBuf,
}

impl FleetPaths {
    /// Create a new FleetPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, LedgerError> {
        let base_dir = if let Ok(custom) = std::env::var("FLEET_LEDGER_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            let dirs = ProjectDirs::from("", "", "fleet-ledger").ok_or_else(|| {
                LedgerError::Config("could not determine a home directory".to_string())
            })?;
            dirs.config_dir().to_path_buf()
        };

        Ok(Self { base_dir })
    }

    /// Create FleetPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Data directory holding the JSON stores
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Path to the JSONL audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Path to expenses.json
    pub fn expenses_file(&self) -> PathBuf {
        self.data_dir().join("expenses.json")
    }

    /// Path to bank_txns.json
    pub fn bank_txns_file(&self) -> PathBuf {
        self.data_dir().join("bank_txns.json")
    }

    /// Path to vehicles.json
    pub fn vehicles_file(&self) -> PathBuf {
        self.data_dir().join("vehicles.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), LedgerError> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            LedgerError::Storage(format!("failed to create base directory: {}", e))
        })?;

        std::fs::create_dir_all(self.data_dir()).map_err(|e| {
            LedgerError::Storage(format!("failed to create data directory: {}", e))
        })?;

        Ok(())
    }

    /// Check whether the ledger has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}
