//! In-memory handler

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::traits::{render_message, Handler, HandlerError, HandlerResult};
use crate::level::Level;

/// A message captured by [`MemoryHandler`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub level: Level,
    pub message: String,
}

/// Handler that keeps rendered messages in memory
///
/// Intended for tests and for hosts that want to inspect recent output.
/// Once closed it rejects further messages, which makes use-after-close
/// visible instead of silent.
///
/// # Example
///
/// ```
/// use logstack_core::{Handler, Level, MemoryHandler};
///
/// let handler = MemoryHandler::new();
/// handler.log(Level::Warning, "queue depth {}", &[&120]).unwrap();
/// assert_eq!(handler.messages(), vec!["queue depth 120".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct MemoryHandler {
    records: RwLock<Vec<Record>>,
    closes: AtomicUsize,
}

impl MemoryHandler {
    /// Create a new empty memory handler
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured records, oldest first
    pub fn records(&self) -> Vec<Record> {
        self.records.read().clone()
    }

    /// Captured messages without their levels
    pub fn messages(&self) -> Vec<String> {
        self.records
            .read()
            .iter()
            .map(|r| r.message.clone())
            .collect()
    }

    /// Number of captured records
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Check if nothing was captured
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all captured records
    pub fn clear(&self) {
        self.records.write().clear();
    }

    /// How many times `close` has been called
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Whether `close` has been called at least once
    pub fn is_closed(&self) -> bool {
        self.close_count() > 0
    }
}

impl Handler for MemoryHandler {
    fn log(&self, level: Level, message: &str, args: &[&dyn fmt::Display]) -> HandlerResult<()> {
        if self.is_closed() {
            return Err(HandlerError::Closed("memory".to_string()));
        }
        let message = render_message(message, args)?;
        self.records.write().push(Record { level, message });
        Ok(())
    }

    fn close(&self) -> HandlerResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
