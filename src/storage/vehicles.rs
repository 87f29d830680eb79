//! Vehicle repository for JSON storage

use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{Vehicle, VehicleId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable vehicle data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct VehicleData {
    vehicles: Vec<Vehicle>,
}

/// Repository for vehicle persistence
pub struct VehicleRepository {
    path: PathBuf,
    data: RwLock<Vec<Vehicle>>,
}

impl VehicleRepository {
    /// Create a new vehicle repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Vec::new()),
        }
    }

    /// Load vehicles from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: VehicleData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire write lock: {}", e)))?;

        *data = file_data.vehicles;
        Ok(())
    }

    /// Save vehicles to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire read lock: {}", e)))?;

        let file_data = VehicleData {
            vehicles: data.clone(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    /// Get a vehicle by ID
    pub fn get(&self, id: VehicleId) -> Result<Option<Vehicle>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire read lock: {}", e)))?;

        Ok(data.iter().find(|v| v.id == id).cloned())
    }

    /// Find a vehicle by registration number, case-insensitive
    pub fn get_by_reg_number(&self, reg_number: &str) -> Result<Option<Vehicle>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire read lock: {}", e)))?;

        let needle = reg_number.trim().to_lowercase();
        Ok(data
            .iter()
            .find(|v| v.reg_number.to_lowercase() == needle)
            .cloned())
    }

    /// Get all vehicles in stored order
    pub fn get_all(&self) -> Result<Vec<Vehicle>, LedgerError> {
        let data = self
            .data
            .read()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire read lock: {}", e)))?;

        Ok(data.clone())
    }

    /// Insert or update a vehicle
    pub fn upsert(&self, vehicle: Vehicle) -> Result<(), LedgerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire write lock: {}", e)))?;

        match data.iter_mut().find(|v| v.id == vehicle.id) {
            Some(existing) => *existing = vehicle,
            None => data.push(vehicle),
        }
        Ok(())
    }

    /// Delete a vehicle, returning it if it existed
    pub fn delete(&self, id: VehicleId) -> Result<Option<Vehicle>, LedgerError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire write lock: {}", e)))?;

        let pos = data.iter().position(|v| v.id == id);
        Ok(pos.map(|p| data.remove(p)))
    }
}
