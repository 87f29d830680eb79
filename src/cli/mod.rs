//! CLI command handlers
//!
//! Bridges clap argument parsing with the service layer. One handler module
//! per command area, each exposing a `Commands` enum and a
//! `handle_*_command` function.

pub mod bank;
pub mod dupes;
pub mod expense;
pub mod export;
pub mod split;
pub mod vehicle;

pub use bank::{handle_bank_command, BankCommands};
pub use dupes::{handle_dupes_command, DupesCommands};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportCommands};
pub use split::{handle_split_command, SplitArgs};
pub use vehicle::{handle_vehicle_command, VehicleCommands};

use crate::config::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{BankTxnId, ExpenseId, Vehicle, VehicleId};
use crate::storage::Storage;

/// Resolve an expense identifier: full UUID, or the short `exp-xxxxxxxx`
/// form shown in listings.
pub fn resolve_expense_id(storage: &Storage, identifier: &str) -> LedgerResult<ExpenseId> {
    if let Ok(id) = identifier.parse::<ExpenseId>() {
        if storage.expenses.get(id)?.is_some() {
            return Ok(id);
        }
    }

    let matches: Vec<ExpenseId> = storage
        .expenses
        .get_all()?
        .iter()
        .map(|e| e.id)
        .filter(|id| id.to_string() == identifier)
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(LedgerError::expense_not_found(identifier)),
        _ => Err(LedgerError::Validation(format!(
            "'{}' matches more than one expense; use the full UUID",
            identifier
        ))),
    }
}

/// Resolve a bank transaction identifier, accepting the `bnk-xxxxxxxx`
/// short form.
pub fn resolve_bank_txn_id(storage: &Storage, identifier: &str) -> LedgerResult<BankTxnId> {
    if let Ok(id) = identifier.parse::<BankTxnId>() {
        if storage.bank_txns.get(id)?.is_some() {
            return Ok(id);
        }
    }

    let matches: Vec<BankTxnId> = storage
        .bank_txns
        .get_all()?
        .iter()
        .map(|t| t.id)
        .filter(|id| id.to_string() == identifier)
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(LedgerError::bank_txn_not_found(identifier)),
        _ => Err(LedgerError::Validation(format!(
            "'{}' matches more than one bank transaction; use the full UUID",
            identifier
        ))),
    }
}

/// Resolve a vehicle by registration number, full UUID, or short id form
pub fn resolve_vehicle(storage: &Storage, identifier: &str) -> LedgerResult<Vehicle> {
    if let Some(vehicle) = storage.vehicles.get_by_reg_number(identifier)? {
        return Ok(vehicle);
    }

    if let Ok(id) = identifier.parse::<VehicleId>() {
        if let Some(vehicle) = storage.vehicles.get(id)? {
            return Ok(vehicle);
        }
    }

    storage
        .vehicles
        .get_all()?
        .into_iter()
        .find(|v| v.id.to_string() == identifier)
        .ok_or_else(|| LedgerError::vehicle_not_found(identifier))
}

/// Resolve an explicit vehicle identifier, falling back to the configured
/// default vehicle when none is given.
pub fn resolve_vehicle_or_default(
    storage: &Storage,
    settings: &Settings,
    identifier: Option<&str>,
) -> LedgerResult<Vehicle> {
    match identifier.or(settings.default_vehicle.as_deref()) {
        Some(id) => resolve_vehicle(storage, id),
        None => Err(LedgerError::Validation(
            "no vehicle given and no default vehicle configured".to_string(),
        )),
    }
}
