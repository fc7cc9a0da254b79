//! No-op handler implementation

use std::fmt;

use super::traits::{Handler, HandlerResult};
use crate::level::Level;

/// A handler that discards everything
///
/// Useful as a placeholder registration or to silence a handler type
/// without detaching it from loggers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl NoopHandler {
    /// Create a new no-op handler
    pub fn new() -> Self {
        Self
    }
}

impl Handler for NoopHandler {
    fn log(&self, _level: Level, _message: &str, _args: &[&dyn fmt::Display]) -> HandlerResult<()> {
        Ok(())
    }

    fn close(&self) -> HandlerResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_handler() {
        let handler = NoopHandler::new();

        // These should all do nothing without failing
        handler.log(Level::Debug, "debug message", &[]).unwrap();
        handler.log(Level::Fatal, "fatal message", &[]).unwrap();
        handler.close().unwrap();
        handler.close().unwrap();
    }
}
