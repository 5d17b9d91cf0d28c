//! Run settings
//!
//! Loaded from a JSON file by the binary. Missing fields take their defaults
//! and unknown fields are ignored.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::{DeliveryMode, GameOptions};

/// Settings could not be loaded
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Grid width in tiles
    pub width: i32,
    /// Grid height in tiles
    pub height: i32,
    /// Fixed run seed; a fresh one per run when absent
    pub seed: Option<u64>,
    pub mode: DeliveryMode,
    /// Run clock in seconds
    pub run_seconds: u32,
    pub inventory_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: None,
            mode: DeliveryMode::Packages,
            run_seconds: DEFAULT_RUN_SECONDS,
            inventory_capacity: INVENTORY_CAPACITY,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Clamp values the generator cannot work with
    pub fn validated(mut self) -> Self {
        self.width = self.width.max(MIN_GRID_SIDE);
        self.height = self.height.max(MIN_GRID_SIDE);
        self.inventory_capacity = self.inventory_capacity.max(1);
        self
    }

    /// Options for a new run
    pub fn game_options(&self) -> GameOptions {
        let settings = self.clone().validated();
        GameOptions {
            width: settings.width,
            height: settings.height,
            seed: settings.seed,
            mode: settings.mode,
            run_seconds: settings.run_seconds,
            inventory_capacity: settings.inventory_capacity,
        }
    }
}
