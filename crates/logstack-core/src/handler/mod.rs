//! Log output handlers
//!
//! - `Handler` trait for implementing custom destinations
//! - Built-in implementations: `ConsoleHandler`, `FileHandler`, `StackHandler`
//! - `NoopHandler` and `MemoryHandler` for silencing and capturing output

mod traits;
mod console;
mod file;
mod stack;
mod noop;
mod memory;

pub use traits::{Handler, HandlerType, HandlerError, HandlerResult, SharedHandler};
pub use console::ConsoleHandler;
pub use file::{FileHandler, BACKUP_TIMESTAMP_FORMAT};
pub use stack::StackHandler;
pub use noop::NoopHandler;
pub use memory::{MemoryHandler, Record};
