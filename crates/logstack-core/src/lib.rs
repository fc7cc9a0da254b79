//! logstack core
//!
//! Leveled, multi-destination logging with shared handlers.
//! A [`Manager`] owns one instance of each handler (console, rotating file,
//! and a fan-out stack) and hands out context-scoped [`Logger`]s that
//! reference them. Writes are synchronous and happen outside every
//! registry lock.
//!
//! ```rust,no_run
//! use logstack_core::{Config, Manager, log_info};
//!
//! let config = Config::load(Config::user_path())?;
//! let manager = Manager::new(config)?;
//!
//! let logger = manager.get_logger("worker");
//! logger.info("started");
//! log_info!(logger, "processed {} jobs", 12);
//!
//! manager.close()?;
//! # Ok::<(), logstack_core::LogError>(())
//! ```

pub mod level;
pub mod format;
pub mod handler;
pub mod logger;
pub mod config;
pub mod error;
pub mod manager;
pub mod global;

// Re-export commonly used types
pub use level::{Level, ParseLevelError};

pub use format::FormatError;

pub use handler::{
    Handler, HandlerType, HandlerError, HandlerResult, SharedHandler,
    ConsoleHandler, FileHandler, StackHandler, NoopHandler, MemoryHandler, Record,
};

pub use logger::Logger;

pub use config::{Config, ConfigError, ConsoleConfig, FileConfig, StackConfig, StackHandlers};

pub use error::{LogError, LogResult};

pub use manager::{Manager, builtin_wiring};
