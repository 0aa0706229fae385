//! Viewer configuration
//!
//! Every field has a default, so a config file only needs the values it
//! changes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::storage::DEFAULT_POSE_KEY;
use crate::camera::OrbitLimits;
use crate::catalog::{AssetId, Catalog, PRODUCT_LINE};
use crate::prefetch::PrefetchTiming;

/// Error type for configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog entry #{index} ({entry:?})")]
    InvalidCatalogEntry { index: usize, entry: String },

    #[error("Storage key must not be empty")]
    EmptyStorageKey,

    #[error("Invalid orbit distance band: min {min}, max {max}")]
    InvalidOrbit { min: f32, max: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Directory that asset identifiers resolve against
    pub asset_root: PathBuf,
    /// Catalog in display order
    pub catalog: Vec<String>,
    /// Storage key for the camera pose
    pub storage_key: String,
    /// Compact layout (smaller viewport)
    pub compact: bool,
    pub prefetch: PrefetchTiming,
    pub orbit: OrbitLimits,
    /// Debounce between scene attachment and hiding the loading indicator
    pub load_settle_delay_ms: u64,
    /// Byte budget of the fetched-asset cache
    pub cache_budget_bytes: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("public"),
            catalog: PRODUCT_LINE.iter().map(|path| path.to_string()).collect(),
            storage_key: DEFAULT_POSE_KEY.to_string(),
            compact: false,
            prefetch: PrefetchTiming::default(),
            orbit: OrbitLimits::default(),
            load_settle_delay_ms: 100,
            cache_budget_bytes: 256 * 1024 * 1024,
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        if !self.orbit.is_valid() {
            return Err(ConfigError::InvalidOrbit {
                min: self.orbit.min_distance,
                max: self.orbit.max_distance,
            });
        }
        self.catalog().map(|_| ())
    }

    /// Parse the configured catalog into canonical identifiers
    pub fn catalog(&self) -> Result<Catalog, ConfigError> {
        let ids = self
            .catalog
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                AssetId::parse(entry).map_err(|_| ConfigError::InvalidCatalogEntry {
                    index,
                    entry: entry.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Catalog::new(ids))
    }

    pub fn load_settle_delay(&self) -> Duration {
        Duration::from_millis(self.load_settle_delay_ms)
    }
}
