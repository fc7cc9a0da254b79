//! Crate-level error type

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::handler::{HandlerError, HandlerType};

/// Errors surfaced by the manager, configuration loading and the global helpers
#[derive(Error, Debug)]
pub enum LogError {
    /// Configuration failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration document could not be parsed or serialized
    #[error("{0}")]
    ConfigParse(String),

    /// Configuration file could not be read
    #[error("failed to read log config {}: {source}", path.display())]
    ConfigRead { path: PathBuf, source: io::Error },

    /// A handler failed to construct or close
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// No logger has been created for this context
    #[error("logger not found: {0}")]
    LoggerNotFound(String),

    /// No handler is registered under this type
    #[error("handler not registered: {0}")]
    HandlerNotFound(HandlerType),

    /// The process-wide manager was already installed
    #[error("global log manager is already initialized")]
    AlreadyInitialized,
}

pub type LogResult<T> = Result<T, LogError>;
