//! Clinic configuration file support.
//!
//! The configuration is a TOML file holding the business data the engine
//! must not hard-code: the city lookup table, the technician rotation order
//! and the scheduling policies.
//!
//! ```toml
//! roster = "providers.txt"
//!
//! [scheduling]
//! booking_window_months = 6
//! release_slot_on_cancel = false
//! rotation = ["JENNY PATEL", "MONICA FOX"]
//!
//! [[locations]]
//! city = "BRIDGEWATER"
//! county = "Somerset"
//! zip = "08807"
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::models::{LocationEntry, LocationTable};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClinicConfig {
    /// Path to the provider roster, relative to the working directory.
    #[serde(default)]
    pub roster: Option<PathBuf>,
    #[serde(default)]
    pub scheduling: SchedulingSettings,
    #[serde(default = "default_locations")]
    pub locations: Vec<LocationEntry>,
}

/// Policies applied by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchedulingSettings {
    #[serde(default = "default_booking_window_months")]
    pub booking_window_months: u32,
    /// Free a technician's slot when its appointment is cancelled or moved.
    #[serde(default)]
    pub release_slot_on_cancel: bool,
    /// Technician names ("FIRST LAST") in rotation order. Technicians not
    /// listed follow in roster order.
    #[serde(default)]
    pub rotation: Vec<String>,
}

fn default_booking_window_months() -> u32 {
    6
}

fn default_locations() -> Vec<LocationEntry> {
    vec![
        LocationEntry::new("BRIDGEWATER", "Somerset", "08807"),
        LocationEntry::new("EDISON", "Middlesex", "08817"),
        LocationEntry::new("CLARK", "Union", "07066"),
        LocationEntry::new("PISCATAWAY", "Middlesex", "08854"),
        LocationEntry::new("PRINCETON", "Mercer", "08542"),
        LocationEntry::new("MORRISTOWN", "Morris", "07960"),
    ]
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        SchedulingSettings {
            booking_window_months: default_booking_window_months(),
            release_slot_on_cancel: false,
            rotation: Vec::new(),
        }
    }
}

impl Default for ClinicConfig {
    fn default() -> Self {
        ClinicConfig {
            roster: None,
            scheduling: SchedulingSettings::default(),
            locations: default_locations(),
        }
    }
}

impl ClinicConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn location_table(&self) -> LocationTable {
        LocationTable::new(self.locations.clone())
    }
}
