//! Log severity levels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Log levels, ordered from least to most severe
///
/// A message passes a filter when `level >= min_level`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Level {
    Debug = 0,
    #[default]
    Info = 1,
    Warning = 2,
    Error = 3,
    Fatal = 4,
}

impl Level {
    /// All levels in ascending order
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Fatal,
    ];

    /// Tag used inside the brackets of a formatted line
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    /// ANSI color prefix for the level tag, if the level is colored at all
    pub fn color(&self) -> Option<&'static str> {
        match self {
            Level::Debug => Some("\x1b[90m"),
            Level::Info => None,
            Level::Warning => Some("\x1b[33m"),
            Level::Error => Some("\x1b[31m"),
            Level::Fatal => Some("\x1b[1;31m"),
        }
    }

    /// Whether a message at this level passes a `min_level` filter
    pub fn enabled_for(&self, min_level: Level) -> bool {
        *self >= min_level
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warning" | "warn" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_order() {
        assert!(Level::Info > Level::Debug);
        assert!(Level::Warning > Level::Info);
        assert!(Level::Error > Level::Warning);
        assert!(Level::Fatal > Level::Error);
        assert_eq!(Level::Fatal as u8, 4);
    }

    #[test]
    fn test_enabled_for() {
        assert!(Level::Info.enabled_for(Level::Info));
        assert!(Level::Error.enabled_for(Level::Info));
        assert!(!Level::Debug.enabled_for(Level::Info));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!("debug".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("INFO".parse::<Level>().unwrap(), Level::Info);
        assert_eq!("warn".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!(" warning ".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!("fatal".parse::<Level>().unwrap(), Level::Fatal);

        let err = "verbose".parse::<Level>().unwrap_err();
        assert_eq!(err.to_string(), "unknown log level: verbose");
    }

    #[test]
    fn test_display() {
        assert_eq!(Level::Warning.to_string(), "WARNING");
        assert_eq!(format!("[{}]", Level::Info), "[INFO]");
    }

    #[test]
    fn test_colors() {
        assert_eq!(Level::Info.color(), None);
        assert_eq!(Level::Fatal.color(), Some("\x1b[1;31m"));
    }
}
