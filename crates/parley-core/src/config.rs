//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/parley/config.toml)
//! 3. Environment variables (PARLEY_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix
const ENV_PREFIX: &str = "PARLEY";

/// Default conversation key, matching a single shared feed
const DEFAULT_CHANNEL: &str = "messages";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (cached message snapshot)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Remote feed URL (optional; without one the client runs offline)
    #[serde(default)]
    pub feed_url: Option<String>,

    /// Conversation key identifying which feed to read
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Stable author identifier; generated and saved on first send
    #[serde(default)]
    pub author_id: Option<String>,

    /// Author display name
    #[serde(default)]
    pub author_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            feed_url: None,
            channel: default_channel(),
            author_id: None,
            author_name: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (PARLEY_DATA_DIR, PARLEY_FEED_URL,
    ///    PARLEY_CHANNEL, PARLEY_AUTHOR_NAME)
    /// 2. Config file (~/.config/parley/config.toml or PARLEY_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // PARLEY_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // PARLEY_FEED_URL
        if let Ok(val) = std::env::var(format!("{}_FEED_URL", ENV_PREFIX)) {
            self.feed_url = if val.is_empty() { None } else { Some(val) };
        }

        // PARLEY_CHANNEL
        if let Ok(val) = std::env::var(format!("{}_CHANNEL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.channel = val;
            }
        }

        // PARLEY_AUTHOR_NAME
        if let Ok(val) = std::env::var(format!("{}_AUTHOR_NAME", ENV_PREFIX)) {
            self.author_name = if val.is_empty() { None } else { Some(val) };
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with PARLEY_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("parley")
            .join("config.toml")
    }

    /// Get the path to the cached message snapshot
    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join("messages.json")
    }
}

fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parley")
}
