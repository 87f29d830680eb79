//! Vehicle model
//!
//! Reference record every expense is attributed to. Kept minimal: the ledger
//! only needs identity and display data, not the full fleet-operations view.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::VehicleId;

/// Operational status of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VehicleStatus {
    #[default]
    Active,
    Maintenance,
    Idle,
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Maintenance => write!(f, "Maintenance"),
            Self::Idle => write!(f, "Idle"),
        }
    }
}

impl std::str::FromStr for VehicleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "maintenance" => Ok(Self::Maintenance),
            "idle" => Ok(Self::Idle),
            _ => Err(format!(
                "unknown vehicle status: '{}'. Valid values: active, maintenance, idle",
                s
            )),
        }
    }
}

/// A fleet vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique identifier
    pub id: VehicleId,

    /// Registration plate (e.g. "MH-12-PQ-4567")
    pub reg_number: String,

    /// Make and model
    #[serde(default)]
    pub model: String,

    /// Operational status
    #[serde(default)]
    pub status: VehicleStatus,
}

impl Vehicle {
    /// Create a new active vehicle
    pub fn new(reg_number: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: VehicleId::new(),
            reg_number: reg_number.into(),
            model: model.into(),
            status: VehicleStatus::Active,
        }
    }

    /// Validate the record
    pub fn validate(&self) -> Result<(), VehicleValidationError> {
        if self.reg_number.trim().is_empty() {
            return Err(VehicleValidationError::EmptyRegNumber);
        }
        Ok(())
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.model.is_empty() {
            write!(f, "{}", self.reg_number)
        } else {
            write!(f, "{} ({})", self.reg_number, self.model)
        }
    }
}

/// Validation errors for vehicles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleValidationError {
    EmptyRegNumber,
}

impl fmt::Display for VehicleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRegNumber => write!(f, "vehicle registration number cannot be empty"),
        }
    }
}

impl std::error::Error for VehicleValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_vehicle() {
        let vehicle = Vehicle::new("MH-12-PQ-4567", "Tata Prima 4028.S");
        assert_eq!(vehicle.status, VehicleStatus::Active);
        assert!(vehicle.validate().is_ok());
        assert_eq!(format!("{}", vehicle), "MH-12-PQ-4567 (Tata Prima 4028.S)");
    }

    #[test]
    fn test_validate_empty_reg() {
        let vehicle = Vehicle::new("  ", "Model");
        assert_eq!(
            vehicle.validate(),
            Err(VehicleValidationError::EmptyRegNumber)
        );
    }

    #[test]
    fn test_serialization() {
        let vehicle = Vehicle::new("KA-01-RS-9876", "Ashok Leyland 3520");
        let json = serde_json::to_string(&vehicle).unwrap();
        let deserialized: Vehicle = serde_json::from_str(&json).unwrap();
        assert_eq!(vehicle.id, deserialized.id);
        assert_eq!(vehicle.reg_number, deserialized.reg_number);
    }
}
