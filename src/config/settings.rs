//! User settings
//!
//! Preferences for display formatting and the default GST treatment of new
//! entries. Stored as pretty JSON next to the data directory.

use serde::{Deserialize, Serialize};

use super::paths::FleetPaths;
use crate::error::LedgerError;
use crate::models::taxonomy::GST_SLABS;
use crate::models::PaymentMethod;

/// User settings for the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used in tables and exports
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// GST rate applied when the taxonomy has no suggestion, in percent
    #[serde(default = "default_gst_rate")]
    pub default_gst_rate: u8,

    /// Registration number of the vehicle new expenses default to
    #[serde(default)]
    pub default_vehicle: Option<String>,

    /// Payment method assumed when an expense doesn't name one
    #[serde(default)]
    pub default_payment_method: PaymentMethod,

    /// Whether `bank list` includes excluded transactions by default
    #[serde(default)]
    pub show_excluded: bool,

    /// Whether initial setup has been completed
    #[serde(default)]
    pub setup_completed: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "₹".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_gst_rate() -> u8 {
    crate::models::taxonomy::DEFAULT_GST_RATE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            default_gst_rate: default_gst_rate(),
            default_vehicle: None,
            default_payment_method: PaymentMethod::default(),
            show_excluded: false,
            setup_completed: false,
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &FleetPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| LedgerError::Io(format!("failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents)
                .map_err(|e| LedgerError::Config(format!("failed to parse settings file: {}", e)))?;

            settings.validate()?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &FleetPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Config(format!("failed to serialize settings: {}", e)))?;

        std::fs::write(&settings_path, contents)
            .map_err(|e| LedgerError::Io(format!("failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject settings that name a GST rate outside the standard slabs
    pub fn validate(&self) -> Result<(), LedgerError> {
        if !GST_SLABS.contains(&self.default_gst_rate) {
            return Err(LedgerError::Config(format!(
                "default GST rate {}% is not a standard slab",
                self.default_gst_rate
            )));
        }
        Ok(())
    }
}
