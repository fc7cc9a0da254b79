//! Process-wide manager
//!
//! Hosts that don't want to thread a [`Manager`] through their code can
//! install one here at startup and shut it down on exit.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::Config;
use crate::error::{LogError, LogResult};
use crate::logger::Logger;
use crate::manager::Manager;

/// Global manager instance
static MANAGER: OnceCell<Manager> = OnceCell::new();

/// Build and install the process-wide manager
///
/// Fails with [`LogError::AlreadyInitialized`] if one is already installed;
/// in that case `config` is not used and no handler is opened.
pub fn init(config: Config) -> LogResult<&'static Manager> {
    let mut created = false;
    let manager = MANAGER.get_or_try_init(|| {
        created = true;
        Manager::new(config)
    })?;

    if created {
        Ok(manager)
    } else {
        Err(LogError::AlreadyInitialized)
    }
}

/// The installed manager, if any
pub fn global() -> Option<&'static Manager> {
    MANAGER.get()
}

/// Logger for `context` from the installed manager
pub fn get_logger(context: &str) -> Option<Arc<Logger>> {
    global().map(|manager| manager.get_logger(context))
}

/// Close every handler of the installed manager; a no-op when none is installed
pub fn shutdown() -> LogResult<()> {
    match global() {
        Some(manager) => manager.close(),
        None => Ok(()),
    }
}
