//! Handler trait definition and shared handler types

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::format::FormatError;
use crate::level::Level;

/// Errors that can occur while constructing, writing to, or closing a handler
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The directory a log file should live in does not exist
    #[error("parent directory does not exist: {}", dir.display())]
    ParentDirMissing { dir: PathBuf },

    /// The log file could not be created because its directory is not writable
    #[error("directory is not writable: {}: {source}", dir.display())]
    DirNotWritable { dir: PathBuf, source: io::Error },

    /// Opening the log file failed
    #[error("failed to open log file {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    /// Writing a formatted line failed
    #[error("failed to write to {target}: {source}")]
    Write { target: String, source: io::Error },

    /// Renaming or reopening during rotation failed
    #[error("failed to rotate log file {}: {source}", path.display())]
    Rotate { path: PathBuf, source: io::Error },

    /// Flushing or releasing the underlying resource failed
    #[error("failed to close {target}: {source}")]
    Close { target: String, source: io::Error },

    /// The handler no longer owns an open destination
    #[error("handler is closed: {0}")]
    Closed(String),

    /// The message template did not match its arguments
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Other error, mostly for custom handlers
    #[error("{0}")]
    Other(String),
}

impl HandlerError {
    /// Create a write error
    pub fn write(target: impl Into<String>, source: io::Error) -> Self {
        Self::Write {
            target: target.into(),
            source,
        }
    }

    /// Create a close error
    pub fn close(target: impl Into<String>, source: io::Error) -> Self {
        Self::Close {
            target: target.into(),
            source,
        }
    }

    /// Create a free-form error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

pub type HandlerResult<T> = Result<T, HandlerError>;

/// A single log output destination
///
/// Implementations:
/// - `ConsoleHandler`: formatted lines to stdout
/// - `FileHandler`: appends to a file, rotating past a size threshold
/// - `StackHandler`: fans out to an ordered list of handlers
/// - `NoopHandler` / `MemoryHandler`: discard or record, for tests and embedding
///
/// Handlers are shared between loggers as [`SharedHandler`], so `log` must be
/// safe to call from several threads at once. Any mutable state lives behind
/// the handler's own lock.
pub trait Handler: Send + Sync {
    /// Write one message
    ///
    /// When `args` is non-empty they are substituted into `message` with
    /// [`crate::format::render`]; a placeholder/argument mismatch is an error.
    fn log(&self, level: Level, message: &str, args: &[&dyn fmt::Display]) -> HandlerResult<()>;

    /// Release the destination
    ///
    /// The manager closes each handler it owns once. Built-in handlers
    /// tolerate a second call, custom handlers need not.
    fn close(&self) -> HandlerResult<()>;
}

/// Type alias for a handler shared between the manager and its loggers
pub type SharedHandler = Arc<dyn Handler>;

/// Registry key for a handler
///
/// Carries no behavior; the built-in kinds only matter to the manager's
/// wiring policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HandlerType {
    Console,
    File,
    Stack,
    Custom(String),
}

impl HandlerType {
    /// Handler type for a caller-defined name
    pub fn custom(name: impl Into<String>) -> Self {
        HandlerType::Custom(name.into())
    }

    /// Registry key as written in configs and errors
    pub fn as_str(&self) -> &str {
        match self {
            HandlerType::Console => "console",
            HandlerType::File => "file",
            HandlerType::Stack => "stack",
            HandlerType::Custom(name) => name,
        }
    }

    /// Whether this is one of the handlers the manager builds itself
    pub fn is_builtin(&self) -> bool {
        !matches!(self, HandlerType::Custom(_))
    }
}

impl fmt::Display for HandlerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for HandlerType {
    fn from(name: &str) -> Self {
        match name {
            "console" => HandlerType::Console,
            "file" => HandlerType::File,
            "stack" => HandlerType::Stack,
            other => HandlerType::Custom(other.to_string()),
        }
    }
}

/// Timestamp layout at the start of every line
pub(crate) const LINE_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Build `YYYY/MM/DD HH:MM:SS [LEVEL] message\n`
pub(crate) fn format_line(level: Level, message: &str, colored: bool) -> String {
    let timestamp = chrono::Local::now().format(LINE_TIMESTAMP_FORMAT);
    match level.color() {
        Some(color) if colored => {
            format!("{} {}[{}]\x1b[0m {}\n", timestamp, color, level, message)
        }
        _ => format!("{} [{}] {}\n", timestamp, level, message),
    }
}

/// Substitute `args` into `message` when any are given
pub(crate) fn render_message(message: &str, args: &[&dyn fmt::Display]) -> HandlerResult<String> {
    Ok(crate::format::render(message, args)?)
}
