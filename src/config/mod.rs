//! Configuration module
//!
//! Path resolution for data and config files plus user settings
//! persistence.

pub mod paths;
pub mod settings;

pub use paths::FleetPaths;
pub use settings::Settings;
