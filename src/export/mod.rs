//! Export module
//!
//! Ledger export in multiple formats:
//! - CSV: spreadsheet-compatible expense and bank feed dumps
//! - JSON: machine-readable full export with schema versioning
//! - YAML: human-readable full export

pub mod csv;
pub mod json;
pub mod yaml;

pub use csv::{export_bank_txns_csv, export_expenses_csv};
pub use json::{export_full_json, FullExport, EXPORT_SCHEMA_VERSION};
pub use yaml::{export_full_yaml, import_from_yaml};
