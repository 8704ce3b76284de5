//! Application settings stored in `config.yaml`.

use std::fs;
use std::path::{Path, PathBuf};

use rosterlab_core::Assumptions;
use serde::{Deserialize, Serialize};

use crate::platform::StorageError;
use crate::util::io::atomic_write;

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8000/api/calculator";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration stored in config.yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the combat resolution service
    #[serde(default = "default_service_url")]
    pub service_url: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub assume_cover: bool,
    #[serde(default)]
    pub assume_half_range: bool,
    /// Last roster opened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_roster: Option<String>,
    /// Last target list opened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_targets: Option<String>,
}

fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            assume_cover: false,
            assume_half_range: false,
            active_roster: None,
            active_targets: None,
        }
    }
}

impl AppConfig {
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join("config.yaml")
    }

    /// Load config.yaml, falling back to defaults when the file is absent.
    pub fn load(data_dir: &Path) -> Result<Self, StorageError> {
        let path = Self::path(data_dir);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| StorageError::Io(format!("Failed to read config: {}", e)))?;

        serde_saphyr::from_str(&content)
            .map_err(|e| StorageError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Stored assumption defaults with command-line switches applied.
    ///
    /// A switch can only turn its flag on; a flag not passed keeps its stored value.
    pub fn assumptions_with(&self, cover: bool, half_range: bool) -> Assumptions {
        Assumptions {
            assume_cover: cover || self.assume_cover,
            assume_half_range: half_range || self.assume_half_range,
        }
    }

    pub fn save(&self, data_dir: &Path) -> Result<(), StorageError> {
        fs::create_dir_all(data_dir)
            .map_err(|e| StorageError::Io(format!("Failed to create data directory: {}", e)))?;

        let yaml = serde_saphyr::to_string(self)
            .map_err(|e| StorageError::Serialize(format!("Failed to serialize config: {}", e)))?;

        atomic_write(&Self::path(data_dir), &yaml)
            .map_err(|e| StorageError::Io(format!("Failed to write config: {}", e)))
    }
}
