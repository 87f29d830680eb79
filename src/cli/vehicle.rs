//! Vehicle CLI commands

use clap::Subcommand;

use crate::audit::EntityType;
use crate::error::LedgerResult;
use crate::models::{Vehicle, VehicleStatus};
use crate::storage::Storage;

/// Vehicle subcommands
#[derive(Subcommand)]
pub enum VehicleCommands {
    /// Register a new vehicle
    Add {
        /// Registration number (e.g., "KA-01-AB-1234")
        reg_number: String,
        /// Vehicle model
        #[arg(short, long, default_value = "")]
        model: String,
    },
    /// List all vehicles
    List,
    /// Change a vehicle's status
    Status {
        /// Registration number or ID
        vehicle: String,
        /// New status (active, maintenance, idle)
        status: String,
    },
}

/// Handle a vehicle command
pub fn handle_vehicle_command(storage: &Storage, cmd: VehicleCommands) -> LedgerResult<()> {
    match cmd {
        VehicleCommands::Add { reg_number, model } => {
            if storage.vehicles.get_by_reg_number(&reg_number)?.is_some() {
                return Err(crate::error::LedgerError::Duplicate {
                    entity_type: "Vehicle",
                    identifier: reg_number,
                });
            }

            let vehicle = Vehicle::new(reg_number, model);
            vehicle
                .validate()
                .map_err(|e| crate::error::LedgerError::Validation(e.to_string()))?;

            storage.vehicles.upsert(vehicle.clone())?;
            storage.vehicles.save()?;
            storage.log_create(
                EntityType::Vehicle,
                vehicle.id.to_string(),
                Some(vehicle.reg_number.clone()),
                &vehicle,
            )?;

            println!("Registered vehicle: {}", vehicle.reg_number);
            println!("  ID: {}", vehicle.id);
        }

        VehicleCommands::List => {
            let vehicles = storage.vehicles.get_all()?;
            if vehicles.is_empty() {
                println!("No vehicles registered.");
                return Ok(());
            }
            for vehicle in vehicles {
                println!(
                    "{}  {:14} {:20} {}",
                    vehicle.id, vehicle.reg_number, vehicle.model, vehicle.status
                );
            }
        }

        VehicleCommands::Status { vehicle, status } => {
            let mut found = super::resolve_vehicle(storage, &vehicle)?;
            let before = found.clone();

            found.status = status
                .parse::<VehicleStatus>()
                .map_err(crate::error::LedgerError::Validation)?;

            storage.vehicles.upsert(found.clone())?;
            storage.vehicles.save()?;
            storage.log_update(
                EntityType::Vehicle,
                found.id.to_string(),
                Some(found.reg_number.clone()),
                &before,
                &found,
            )?;

            println!("{} is now {}", found.reg_number, found.status);
        }
    }

    Ok(())
}
