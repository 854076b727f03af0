//! Configuration management for FileBuddy
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.filebuddy/config.toml

use crate::errors::{FileBuddyError, Result};
use crate::tools::executor::MAX_PARALLEL_OPERATIONS;
use crate::tools::fs::expand_home;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Complete configuration for FileBuddy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tool execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Upper bound on concurrently running tool calls
    pub max_parallel: usize,
    /// Directory `~` expands to; the user's home when unset
    pub home_dir: Option<String>,
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            max_parallel: MAX_PARALLEL_OPERATIONS,
            home_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FileBuddyError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| FileBuddyError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Standard configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".filebuddy").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.tools.max_parallel == 0 {
            return Err(FileBuddyError::ConfigError(
                "max_parallel must be greater than 0".to_string(),
            ));
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(FileBuddyError::ConfigError(format!(
                    "Invalid log format: {}",
                    other
                )))
            }
        }

        EnvFilter::try_new(&self.logging.level).map_err(|e| {
            FileBuddyError::ConfigError(format!(
                "Invalid log level '{}': {}",
                self.logging.level, e
            ))
        })?;

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FileBuddyError::ConfigError(format!("Failed to create config dir: {}", e))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| FileBuddyError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| FileBuddyError::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    /// Home directory the tools expand `~` against
    pub fn home_dir(&self) -> Option<PathBuf> {
        match &self.tools.home_dir {
            Some(configured) => Some(expand_home(configured, dirs::home_dir().as_deref())),
            None => dirs::home_dir(),
        }
    }
}
