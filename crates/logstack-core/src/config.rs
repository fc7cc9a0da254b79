//! Logging configuration
//!
//! The configuration is plain data: a host deserializes it (YAML by default,
//! see [`Config::load`]), calls [`Config::validate`], and hands it to
//! [`crate::Manager::new`].
//!
//! ```yaml
//! level: info
//! console:
//!   enabled: true
//!   colored: true
//! file:
//!   enabled: false
//!   path: /var/log/app/app.log
//!   max_size: 10485760
//! stack:
//!   enabled: true
//!   handlers:
//!     console: true
//!     file: true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LogError, LogResult};
use crate::level::Level;

/// Validation failure for a single configuration field
///
/// Renders as `log config error in field '<field>' with value '<value>': <message>`,
/// leaving out the value segment when the value is empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("log config error in field '{field}'{}: {message}", value_segment(value))]
pub struct ConfigError {
    pub field: String,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

fn value_segment(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!(" with value '{}'", value)
    }
}

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// With the stack enabled, also attach the console standalone unless the
    /// stack already contains it. Without a stack the console is always attached.
    pub enabled: bool,
    /// Wrap level tags in ANSI colors
    pub colored: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            colored: false,
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Same as [`ConsoleConfig::enabled`], for the file
    pub enabled: bool,
    /// Log file location; its directory must already exist
    pub path: String,
    /// Rotation threshold in bytes, 0 disables rotation
    pub max_size: u64,
}

/// Which built-in handlers the stack contains
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StackHandlers {
    pub console: bool,
    pub file: bool,
}

/// Stack (fan-out) settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Attach the stack handler to new loggers
    pub enabled: bool,
    pub handlers: StackHandlers,
}

/// Complete logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum level for newly created loggers
    pub level: String,
    pub console: ConsoleConfig,
    pub file: FileConfig,
    pub stack: StackConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: Level::Info.as_str().to_lowercase(),
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
            stack: StackConfig::default(),
        }
    }
}

impl Config {
    /// Parse a YAML document; absent sections take their defaults
    pub fn from_yaml_str(content: &str) -> LogResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| LogError::ConfigParse(format!("Failed to parse YAML: {}", e)))
    }

    /// Load a config file; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> LogResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| LogError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Default user-level location (~/.config/logstack/config.yaml)
    pub fn user_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        config_dir.join("logstack").join("config.yaml")
    }

    /// Load from [`Config::user_path`]
    pub fn load_user() -> LogResult<Self> {
        Self::load(Self::user_path())
    }

    /// Serialize back to YAML
    pub fn to_yaml(&self) -> LogResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| LogError::ConfigParse(format!("Failed to serialize YAML: {}", e)))
    }

    /// Set the minimum level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level.as_str().to_lowercase();
        self
    }

    /// Configure the console handler
    pub fn with_console(mut self, enabled: bool, colored: bool) -> Self {
        self.console = ConsoleConfig { enabled, colored };
        self
    }

    /// Enable the file handler at `path`
    pub fn with_file(mut self, path: impl Into<String>, max_size: u64) -> Self {
        self.file = FileConfig {
            enabled: true,
            path: path.into(),
            max_size,
        };
        self
    }

    /// Enable the stack with the given members
    pub fn with_stack(mut self, console: bool, file: bool) -> Self {
        self.stack = StackConfig {
            enabled: true,
            handlers: StackHandlers { console, file },
        };
        self
    }

    /// Parsed minimum level
    pub fn min_level(&self) -> Result<Level, ConfigError> {
        self.level.parse().map_err(|_| {
            ConfigError::new(
                "level",
                self.level.as_str(),
                "must be one of debug, info, warning, error, fatal",
            )
        })
    }

    /// Whether the file handler is used standalone or inside the stack
    pub fn file_in_use(&self) -> bool {
        self.file.enabled || (self.stack.enabled && self.stack.handlers.file)
    }

    /// Check the configuration for inconsistencies
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.min_level()?;

        if self.file_in_use() && self.file.path.trim().is_empty() {
            return Err(ConfigError::new(
                "file.path",
                "",
                "path is required when the file handler is used",
            ));
        }

        if self.stack.enabled && !self.stack.handlers.console && !self.stack.handlers.file {
            return Err(ConfigError::new(
                "stack.handlers",
                "",
                "stack is enabled but contains no handlers",
            ));
        }

        Ok(())
    }
}
