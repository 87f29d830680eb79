//! fleet-ledger - Vehicle fleet expense ledger with bank reconciliation
//!
//! This library provides the core functionality for the fleet-ledger
//! application: an expense ledger for small transport operators that
//! reconciles manually recorded expenses against imported bank statement
//! lines, with GST tracking throughout.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (expenses, bank transactions, vehicles)
//! - `ledger`: In-memory snapshot the reconciliation core operates on
//! - `tax`: GST arithmetic in integer paise
//! - `storage`: JSON file storage layer
//! - `services`: Business logic (matching, splitting, duplicates, import)
//! - `audit`: Audit logging system
//! - `display`: Table and detail formatting
//! - `export`: CSV/JSON/YAML exports
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use fleet_ledger::config::{paths::FleetPaths, settings::Settings};
//!
//! let paths = FleetPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod ledger;
pub mod models;
pub mod services;
pub mod storage;
pub mod tax;

pub use error::{LedgerError, LedgerResult};
