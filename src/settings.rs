//! Migration settings
//!
//! The format version and cell size are injected here rather than read from
//! globals, so the same build can migrate as any version.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{CELL_SIZE, CURRENT_GAME_VERSION};
use crate::persistence::migration::version::{FormatVersion, VersionError};
use crate::persistence::{PersistenceError, Result};

/// How a migration batch is matched against the running format version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ChainPolicy {
    /// Run a batch only when the running version equals its target
    #[default]
    Exact,
    /// Run every batch whose target is at or below the running version
    Cumulative,
}

impl ChainPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainPolicy::Exact => "Exact",
            ChainPolicy::Cumulative => "Cumulative",
        }
    }
}

impl FromStr for ChainPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(ChainPolicy::Exact),
            "cumulative" | "chain" | "chained" => Ok(ChainPolicy::Cumulative),
            _ => Err(format!(
                "unknown chain policy '{}' (expected exact or cumulative)",
                s
            )),
        }
    }
}

/// Configuration consumed by the migration engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationSettings {
    /// Format version of the running build, e.g. "1.4.2"
    pub current_version: String,
    /// Cell edge in pixels, used to turn tile coordinates into object positions
    pub cell_size: i32,
    /// Batch matching policy
    pub chain_policy: ChainPolicy,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            current_version: CURRENT_GAME_VERSION.to_string(),
            cell_size: CELL_SIZE,
            chain_policy: ChainPolicy::Exact,
        }
    }
}

impl MigrationSettings {
    /// Default settings running as `version`
    pub fn for_version(version: impl Into<String>) -> Self {
        Self {
            current_version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: ChainPolicy) -> Self {
        self.chain_policy = policy;
        self
    }

    pub fn with_cell_size(mut self, cell_size: i32) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn current_format_version(&self) -> std::result::Result<FormatVersion, VersionError> {
        self.current_version.parse()
    }

    /// Reject values that would make distinct tiles land on one pixel position
    pub fn validate(&self) -> Result<()> {
        if self.cell_size <= 0 {
            return Err(PersistenceError::InvalidSettings(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        Ok(())
    }

    /// Load settings from a JSON file
    pub fn try_load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| PersistenceError::io(path, e))?;
        let settings: Self = serde_json::from_str(&json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) if e.is_not_found() => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| PersistenceError::io(path, e))?;
        log::info!("Settings saved");
        Ok(())
    }
}
