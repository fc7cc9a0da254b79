//! Console handler implementation

use std::fmt;
use std::io::{self, Write};

use parking_lot::Mutex;

use super::traits::{format_line, render_message, Handler, HandlerError, HandlerResult};
use crate::level::Level;

/// A handler that writes formatted lines to the console (stdout)
///
/// When `colored` is set, the level tag is wrapped in an ANSI color keyed by
/// level. The output stream is not owned, so `close` does nothing.
pub struct ConsoleHandler {
    colored: bool,
    out: Mutex<Box<dyn Write + Send>>,
}

impl Default for ConsoleHandler {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ConsoleHandler {
    /// Create a console handler writing to stdout
    pub fn new(colored: bool) -> Self {
        Self::with_writer(colored, io::stdout())
    }

    /// Create a console handler writing to any stream, e.g. a buffer in tests
    pub fn with_writer(colored: bool, out: impl Write + Send + 'static) -> Self {
        Self {
            colored,
            out: Mutex::new(Box::new(out)),
        }
    }

    /// Whether level tags are wrapped in ANSI colors
    pub fn colored(&self) -> bool {
        self.colored
    }
}

impl Handler for ConsoleHandler {
    fn log(&self, level: Level, message: &str, args: &[&dyn fmt::Display]) -> HandlerResult<()> {
        let message = render_message(message, args)?;
        let line = format_line(level, &message, self.colored);

        let mut out = self.out.lock();
        out.write_all(line.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| HandlerError::write("console", e))
    }

    fn close(&self) -> HandlerResult<()> {
        Ok(())
    }
}

impl fmt::Debug for ConsoleHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleHandler")
            .field("colored", &self.colored)
            .finish()
    }
}
