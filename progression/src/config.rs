//! Configuration for the progression engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::store::{InMemoryProgressStore, JsonFileProgressStore, ProgressStore};
use crate::types::{ProgressionError, Result};

/// Configuration for hosting a progression engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,
}

impl EngineConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Construct the configured progress store.
    pub async fn build_store(&self) -> Result<Arc<dyn ProgressStore>> {
        match self.storage.backend {
            StorageBackend::Memory => Ok(Arc::new(InMemoryProgressStore::new())),
            StorageBackend::JsonFile => {
                let root_dir = self.storage.root_dir.as_ref().ok_or_else(|| {
                    ProgressionError::Config("json_file storage requires root_dir".to_string())
                })?;
                let store = JsonFileProgressStore::new(root_dir).await?;
                Ok(Arc::new(store))
            }
        }
    }
}

/// Which progress store to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Memory,
    JsonFile,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store implementation
    #[serde(default)]
    pub backend: StorageBackend,
    /// Directory for the JSON file store
    #[serde(default)]
    pub root_dir: Option<PathBuf>,
}

/// General configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level for hosts that install a subscriber
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}
