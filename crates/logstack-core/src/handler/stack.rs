//! Stack handler that fans a log call out to several handlers

use std::fmt;

use parking_lot::RwLock;

use super::traits::{Handler, HandlerResult, SharedHandler};
use crate::level::Level;

/// A handler that delivers every call to an ordered list of sub-handlers
///
/// Delivery never short-circuits: a failing sub-handler does not keep the
/// rest from receiving the message, and only the first error is returned.
///
/// An owning stack closes its sub-handlers when closed. A non-owning stack
/// only references them; whoever registered them keeps the job of closing.
///
/// # Example
///
/// ```
/// use logstack_core::{Handler, Level, MemoryHandler, StackHandler};
/// use std::sync::Arc;
///
/// let audit = Arc::new(MemoryHandler::new());
/// let stack = StackHandler::new();
/// stack.add_handler(audit.clone());
///
/// stack.log(Level::Info, "hello", &[]).unwrap();
/// assert_eq!(audit.len(), 1);
/// ```
pub struct StackHandler {
    handlers: RwLock<Vec<SharedHandler>>,
    owns_handlers: bool,
}

impl Default for StackHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl StackHandler {
    /// Create an empty stack that closes its sub-handlers on `close`
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            owns_handlers: true,
        }
    }

    /// Create an empty stack whose `close` leaves sub-handlers open
    pub fn non_owning() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            owns_handlers: false,
        }
    }

    /// Create an owning stack with initial sub-handlers
    pub fn with_handlers(handlers: Vec<SharedHandler>) -> Self {
        Self {
            handlers: RwLock::new(handlers),
            owns_handlers: true,
        }
    }

    /// Append a sub-handler. No de-duplication is performed.
    pub fn add_handler(&self, handler: SharedHandler) {
        self.handlers.write().push(handler);
    }

    /// Snapshot of the sub-handlers in delivery order
    pub fn handlers(&self) -> Vec<SharedHandler> {
        self.handlers.read().clone()
    }

    /// Number of sub-handlers
    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    /// Whether the stack has no sub-handlers
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `close` also closes the sub-handlers
    pub fn owns_handlers(&self) -> bool {
        self.owns_handlers
    }
}

impl Handler for StackHandler {
    fn log(&self, level: Level, message: &str, args: &[&dyn fmt::Display]) -> HandlerResult<()> {
        let handlers = self.handlers();

        let mut first_err = None;
        for handler in &handlers {
            if let Err(e) = handler.log(level, message, args) {
                first_err.get_or_insert(e);
            }
        }

        first_err.map_or(Ok(()), Err)
    }

    fn close(&self) -> HandlerResult<()> {
        if !self.owns_handlers {
            return Ok(());
        }

        let mut first_err = None;
        for handler in &self.handlers() {
            if let Err(e) = handler.close() {
                first_err.get_or_insert(e);
            }
        }

        first_err.map_or(Ok(()), Err)
    }
}

// Implement Debug manually since Arc<dyn Handler> doesn't implement Debug
impl fmt::Debug for StackHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackHandler")
            .field("handlers", &format!("[{} handlers]", self.len()))
            .field("owns_handlers", &self.owns_handlers)
            .finish()
    }
}
