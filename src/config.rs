//! Flowstate Configuration Module
//!
//! Manages persistent configuration for the backend address and the health
//! aggregator credentials. Config is stored in `~/.config/flowstate/config.toml`.
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Environment variables (`FLOWSTATE_BACKEND_URL`, `TERRA_API_KEY`, `TERRA_DEV_ID`)
//! 2. Config file (`~/.config/flowstate/config.toml`)
//! 3. Defaults

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{FlowError, Result};

/// Default backend address (the original deployment ran on the LAN)
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5002";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowConfig {
    /// Backend service base URL
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Health aggregator credentials
    #[serde(default)]
    pub health: HealthKeys,
}

/// Health aggregator credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HealthKeys {
    /// Aggregator API key (sent as `x-api-key`)
    pub api_key: Option<String>,

    /// Aggregator developer id (sent as `dev-id`)
    pub dev_id: Option<String>,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            health: HealthKeys::default(),
        }
    }
}

impl FlowConfig {
    /// Get the config directory path
    ///
    /// Returns `~/.config/flowstate/` on Unix, `%APPDATA%/flowstate/` on Windows
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flowstate")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file
    ///
    /// Returns default config if file doesn't exist.
    /// Returns error if file exists but is malformed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path (used by tests and `--config`)
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| FlowError::Config {
            reason: format!("Failed to read config file: {}", e),
        })?;

        toml::from_str(&content).map_err(|e| FlowError::Config {
            reason: format!("Failed to parse config file: {}", e),
        })
    }

    /// Save configuration to file
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir();
        let path = Self::config_path();

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| FlowError::Config {
                reason: format!("Failed to create config directory: {}", e),
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| FlowError::Config {
            reason: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(&path, content).map_err(|e| FlowError::Config {
            reason: format!("Failed to write config file: {}", e),
        })
    }

    /// Merge with environment variables
    ///
    /// Environment variables take precedence over config file values.
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("FLOWSTATE_BACKEND_URL") {
            if !url.is_empty() {
                self.backend_url = url;
            }
        }

        if let Ok(key) = std::env::var("TERRA_API_KEY") {
            if !key.is_empty() {
                self.health.api_key = Some(key);
            }
        }

        if let Ok(id) = std::env::var("TERRA_DEV_ID") {
            if !id.is_empty() {
                self.health.dev_id = Some(id);
            }
        }

        self
    }

    /// Parse and validate the backend base URL
    pub fn backend_base(&self) -> Result<Url> {
        Url::parse(&self.backend_url).map_err(|e| FlowError::InvalidUrl {
            url: self.backend_url.clone(),
            reason: e.to_string(),
        })
    }

    /// Check if health aggregator credentials are present
    pub fn has_health_keys(&self) -> bool {
        self.health.api_key.is_some() && self.health.dev_id.is_some()
    }
}

/// Mask a credential for display
///
/// Shows first N chars + asterisks, e.g. "S8aYjRBr***"
pub fn mask_key(key: &str, visible_chars: usize) -> String {
    if key.is_empty() {
        return String::new();
    }

    let visible = key.len().min(visible_chars);
    format!("{}***", &key[..visible])
}
