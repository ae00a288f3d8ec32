use harvest_core::{EngineConfig, Schema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarvestConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Print JSON on a single line.
    #[serde(default)]
    pub compact: bool,
    /// Parse input as an HTML fragment rather than a full document.
    #[serde(default)]
    pub fragment: bool,
}

/// Reads config and schema files. Both are YAML, and JSON parses as YAML.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Config files in lookup order: `./harvest.yaml`, then
    /// `~/.harvest/config.yaml`.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![Path::new(".").join("harvest.yaml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".harvest").join("config.yaml"));
        }
        paths
    }

    /// The first config file found on the search path, or the defaults.
    pub async fn load_default() -> Result<HarvestConfig, LoadError> {
        match Self::search_paths().into_iter().find(|path| path.is_file()) {
            Some(path) => {
                debug!(path = %path.display(), "Using config file");
                Self::load_from(&path).await
            }
            None => Ok(HarvestConfig::default()),
        }
    }

    pub async fn load_from(path: &Path) -> Result<HarvestConfig, LoadError> {
        read_yaml(path).await
    }

    pub async fn load_schema(path: &Path) -> Result<Schema, LoadError> {
        read_yaml(path).await
    }
}

async fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_yaml::from_str(&content)?)
}
