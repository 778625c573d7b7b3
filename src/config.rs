//! Configuration loading and management
//!
//! Handles parsing of `.goaltree.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the per-directory configuration file
pub const CONFIG_FILE: &str = ".goaltree.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the goals document
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Report rendering
    #[serde(default)]
    pub display: DisplayConfig,

    /// Persistence settings
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            display: DisplayConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("goals_data.json")
}

/// Display-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Spaces per nesting level in the progress tree
    #[serde(default = "default_indent")]
    pub indent: usize,

    /// Decimal places for percentages
    #[serde(default = "default_precision")]
    pub precision: usize,
}

fn default_indent() -> usize {
    4
}

fn default_precision() -> usize {
    1
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            indent: default_indent(),
            precision: default_precision(),
        }
    }
}

/// Storage-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// How long a save waits for the data file lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    crate::lock::DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a `.goaltree.toml` file.
    ///
    /// A relative `data_file` is resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.validate()?;
        if config.data_file.is_relative() {
            if let Some(dir) = path.parent() {
                config.data_file = dir.join(&config.data_file);
            }
        }
        Ok(config)
    }

    /// Load configuration from a directory, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            match Self::load(&config_path) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(path = %config_path.display(), %err, "ignoring invalid config");
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    /// Resolve configuration for a run.
    ///
    /// An explicit path must load cleanly. Otherwise `<cwd>/.goaltree.toml`
    /// wins over the user config file, and defaults apply when neither exists.
    pub fn resolve(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if cwd.join(CONFIG_FILE).exists() {
            return Ok(Self::load_from_dir(cwd));
        }

        if let Some(path) = user_config_file().filter(|path| path.exists()) {
            match Self::load(&path) {
                Ok(config) => return Ok(config),
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "ignoring invalid user config");
                }
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.data_file.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("data_file cannot be empty".to_string()));
        }
        self.display.validate()?;
        if self.storage.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl DisplayConfig {
    fn validate(&self) -> Result<()> {
        if !(1..=16).contains(&self.indent) {
            return Err(Error::InvalidConfig(
                "display.indent must be between 1 and 16".to_string(),
            ));
        }
        if self.precision > 4 {
            return Err(Error::InvalidConfig(
                "display.precision must be <= 4".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-user configuration file, e.g. `~/.config/goaltree/config.toml`.
pub fn user_config_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "goaltree")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
