//! Configuration file handling

use super::endpoint::{default_retries, default_timeout};
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Starknet RPC URL
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Event signatures decoded when none are given on the command line
    #[serde(default)]
    pub events: Vec<String>,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Global settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Max retry attempts
    #[serde(default = "default_retries")]
    pub retry_attempts: u32,

    /// Events per page
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Blocks per window
    #[serde(default = "default_window_size")]
    pub window_size: u64,

    /// Windows per scan
    #[serde(default = "default_window_count")]
    pub window_count: usize,

    /// Windows drained at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_page_size() -> u64 {
    100
}

fn default_window_size() -> u64 {
    1_000
}

fn default_window_count() -> usize {
    10
}

fn default_concurrency() -> usize {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            retry_attempts: default_retries(),
            page_size: default_page_size(),
            window_size: default_window_size(),
            window_count: default_window_count(),
            concurrency: default_concurrency(),
        }
    }
}

impl ConfigFile {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("event-harvester")
            .join("config.toml")
    }

    /// Load from default path
    pub fn load_default() -> Result<Option<Self>> {
        let path = Self::default_path();
        if path.exists() {
            Ok(Some(Self::load(&path)?))
        } else {
            Ok(None)
        }
    }

    /// Load from a specific path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::InvalidFile(format!("{}: {}", path.display(), e)))?;

        let config: Self = toml::from_str(&content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Save to a specific path
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::InvalidFile(format!("Failed to create directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidFile(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::InvalidFile(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::InvalidFile(format!("Failed to serialize config: {}", e)).into()
        })
    }
}
