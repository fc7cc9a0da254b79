//! Context-scoped logger

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;

use crate::format;
use crate::handler::{HandlerResult, HandlerType, SharedHandler};
use crate::level::Level;

/// Per-context logging façade
///
/// Filters by minimum level, formats the message, prefixes it with
/// `[context] ` and hands it to every attached handler. The handlers are
/// references to instances owned elsewhere (normally the [`crate::Manager`]).
///
/// A dispatch copies the handler map under a short read lock and performs all
/// I/O after releasing it, so a slow handler never blocks `add_handler` or
/// `set_min_level` on the same logger.
///
/// Handler failures never reach the caller; they are reported on stderr and
/// delivery continues with the remaining handlers.
///
/// # Example
///
/// ```
/// use logstack_core::{Level, Logger, MemoryHandler, HandlerType};
/// use std::sync::Arc;
///
/// let capture = Arc::new(MemoryHandler::new());
/// let logger = Logger::new("billing");
/// logger.add_handler(HandlerType::custom("capture"), capture.clone());
///
/// logger.info("invoice sent");
/// logger.log(Level::Warning, "retry {} of {}", &[&2, &5]);
/// logger.debug("filtered out by the default Info level");
///
/// assert_eq!(
///     capture.messages(),
///     vec!["[billing] invoice sent".to_string(), "[billing] retry 2 of 5".to_string()]
/// );
/// ```
pub struct Logger {
    context: String,
    min_level: RwLock<Level>,
    handlers: RwLock<HashMap<HandlerType, SharedHandler>>,
}

impl Logger {
    /// Create a logger for `context` with no handlers and an `Info` minimum level
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            min_level: RwLock::new(Level::default()),
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Create a logger with a specific minimum level
    pub fn with_min_level(context: impl Into<String>, min_level: Level) -> Self {
        let logger = Self::new(context);
        logger.set_min_level(min_level);
        logger
    }

    /// Context prefixed to every message, empty for none
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Current minimum level
    pub fn min_level(&self) -> Level {
        *self.min_level.read()
    }

    /// Change the minimum level; takes effect for the next call
    pub fn set_min_level(&self, level: Level) {
        *self.min_level.write() = level;
    }

    /// Whether a message at `level` would be dispatched
    pub fn is_enabled(&self, level: Level) -> bool {
        level.enabled_for(self.min_level())
    }

    /// Attach `handler` under `handler_type`, replacing any previous reference
    ///
    /// The replaced reference is dropped, not closed.
    pub fn add_handler(&self, handler_type: HandlerType, handler: SharedHandler) {
        self.handlers.write().insert(handler_type, handler);
    }

    /// Detach and close the handler under `handler_type`
    ///
    /// Only for handlers this logger owns exclusively. Handlers shared through
    /// a manager must be removed with [`crate::Manager::remove_handler`].
    pub fn remove_handler(&self, handler_type: &HandlerType) -> HandlerResult<bool> {
        match self.detach_handler(handler_type) {
            Some(handler) => handler.close().map(|_| true),
            None => Ok(false),
        }
    }

    /// Detach the handler under `handler_type` without closing it
    pub fn detach_handler(&self, handler_type: &HandlerType) -> Option<SharedHandler> {
        self.handlers.write().remove(handler_type)
    }

    /// Reference currently attached under `handler_type`
    pub fn handler(&self, handler_type: &HandlerType) -> Option<SharedHandler> {
        self.handlers.read().get(handler_type).cloned()
    }

    /// Whether anything is attached under `handler_type`
    pub fn has_handler(&self, handler_type: &HandlerType) -> bool {
        self.handlers.read().contains_key(handler_type)
    }

    /// Attached handler types, sorted
    pub fn handler_types(&self) -> Vec<HandlerType> {
        let mut types: Vec<_> = self.handlers.read().keys().cloned().collect();
        types.sort();
        types
    }

    /// Drop every handler reference without closing anything
    ///
    /// Closing shared handlers is the manager's job; a logger only lets go of
    /// its references.
    pub fn close(&self) {
        self.handlers.write().clear();
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message, &[]);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message, &[]);
    }

    pub fn warning(&self, message: &str) {
        self.log(Level::Warning, message, &[]);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message, &[]);
    }

    /// Log at `Fatal`. Does not terminate the process.
    pub fn fatal(&self, message: &str) {
        self.log(Level::Fatal, message, &[]);
    }

    /// Log with `{}` placeholders substituted from `args`
    ///
    /// A placeholder/argument mismatch drops the message and reports it on
    /// stderr.
    pub fn log(&self, level: Level, message: &str, args: &[&dyn fmt::Display]) {
        if !self.is_enabled(level) {
            return;
        }

        match format::render(message, args) {
            Ok(rendered) => self.dispatch(level, &rendered),
            Err(e) => eprintln!(
                "[{}] dropped {} message {:?}: {}",
                self.context, level, message, e
            ),
        }
    }

    /// Log pre-built format arguments, as produced by the `log_*!` macros
    pub fn log_fmt(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.is_enabled(level) {
            return;
        }
        self.dispatch(level, &args.to_string());
    }

    fn dispatch(&self, level: Level, message: &str) {
        let line = format!("[{}] {}", self.context, message);

        let handlers: Vec<(HandlerType, SharedHandler)> = self
            .handlers
            .read()
            .iter()
            .map(|(t, h)| (t.clone(), h.clone()))
            .collect();

        for (handler_type, handler) in handlers {
            if let Err(e) = handler.log(level, &line, &[]) {
                eprintln!(
                    "[{}] {} handler failed: {}",
                    self.context, handler_type, e
                );
            }
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("context", &self.context)
            .field("min_level", &self.min_level())
            .field("handlers", &self.handler_types())
            .finish()
    }
}

/// Convenience macros for logging with `format!` syntax
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log_fmt($crate::Level::Debug, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log_fmt($crate::Level::Info, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log_fmt($crate::Level::Warning, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log_fmt($crate::Level::Error, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log_fmt($crate::Level::Fatal, format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{Handler, HandlerError, MemoryHandler, Record};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct FailingHandler {
        calls: AtomicUsize,
    }

    impl Handler for FailingHandler {
        fn log(&self, _level: Level, _message: &str, _args: &[&dyn fmt::Display]) -> HandlerResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(HandlerError::other("disk on fire"))
        }

        fn close(&self) -> HandlerResult<()> {
            Ok(())
        }
    }

    fn capture(logger: &Logger, name: &str) -> Arc<MemoryHandler> {
        let handler = Arc::new(MemoryHandler::new());
        logger.add_handler(HandlerType::custom(name), handler.clone());
        handler
    }

    #[test]
    fn test_context_prefix() {
        let logger = Logger::new("auth");
        let sink = capture(&logger, "sink");
        assert_eq!(logger.context(), "auth");

        logger.info("login ok");
        assert_eq!(
            sink.records(),
            vec![Record {
                level: Level::Info,
                message: "[auth] login ok".to_string()
            }]
        );
    }

    #[test]
    fn test_level_filtering() {
        let logger = Logger::with_min_level("svc", Level::Warning);
        let sink = capture(&logger, "sink");

        logger.debug("d");
        logger.info("i");
        logger.warning("w");
        logger.error("e");
        logger.fatal("f");

        let levels: Vec<_> = sink.records().into_iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![Level::Warning, Level::Error, Level::Fatal]);

        logger.set_min_level(Level::Debug);
        logger.debug("now visible");
        assert_eq!(sink.len(), 4);
        assert_eq!(logger.min_level(), Level::Debug);
    }

    #[test]
    fn test_every_handler_gets_one_call() {
        let logger = Logger::new("svc");
        let a = capture(&logger, "a");
        let b = capture(&logger, "b");

        logger.log(Level::Info, "user {} logged in", &[&"bob"]);

        assert_eq!(a.messages(), vec!["[svc] user bob logged in".to_string()]);
        assert_eq!(b.messages(), vec!["[svc] user bob logged in".to_string()]);
    }

    #[test]
    fn test_format_mismatch_dropped() {
        let logger = Logger::new("svc");
        let sink = capture(&logger, "sink");

        logger.log(Level::Error, "{} and {}", &[&1]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_handler_failure_does_not_stop_others() {
        let logger = Logger::new("svc");
        let failing = Arc::new(FailingHandler::default());
        logger.add_handler(HandlerType::custom("failing"), failing.clone());
        let sink = capture(&logger, "sink");

        logger.error("still delivered");

        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_macros() {
        let logger = Logger::with_min_level("macros", Level::Debug);
        let sink = capture(&logger, "sink");

        let port = 443;
        log_debug!(logger, "d {}", 1);
        log_info!(logger, "listening on {port}");
        log_warning!(logger, "w");
        log_error!(logger, "e {:>3}", 7);
        log_fatal!(logger, "f");

        assert_eq!(
            sink.messages(),
            vec![
                "[macros] d 1".to_string(),
                "[macros] listening on 443".to_string(),
                "[macros] w".to_string(),
                "[macros] e   7".to_string(),
                "[macros] f".to_string(),
            ]
        );
    }

    #[test]
    fn test_add_replaces_without_closing() {
        let logger = Logger::new("svc");
        let first = Arc::new(MemoryHandler::new());
        let second = Arc::new(MemoryHandler::new());

        logger.add_handler(HandlerType::Console, first.clone());
        logger.add_handler(HandlerType::Console, second.clone());
        logger.info("x");

        assert_eq!(first.close_count(), 0);
        assert!(first.is_empty());
        assert_eq!(second.len(), 1);
        assert_eq!(logger.handler_types(), vec![HandlerType::Console]);
    }

    #[test]
    fn test_remove_closes_and_detach_does_not() {
        let logger = Logger::new("svc");
        let owned = Arc::new(MemoryHandler::new());
        let shared = Arc::new(MemoryHandler::new());
        logger.add_handler(HandlerType::File, owned.clone());
        logger.add_handler(HandlerType::Stack, shared.clone());

        assert!(logger.remove_handler(&HandlerType::File).unwrap());
        assert!(!logger.remove_handler(&HandlerType::File).unwrap());
        assert_eq!(owned.close_count(), 1);

        assert!(logger.detach_handler(&HandlerType::Stack).is_some());
        assert_eq!(shared.close_count(), 0);
        assert!(logger.handler_types().is_empty());
    }

    #[test]
    fn test_close_only_detaches() {
        let logger = Logger::new("svc");
        let sink = capture(&logger, "sink");

        logger.close();
        logger.info("nobody hears this");

        assert_eq!(sink.close_count(), 0);
        assert!(sink.is_empty());
        assert!(!logger.has_handler(&HandlerType::custom("sink")));
    }

    #[test]
    fn test_concurrent_logging_and_mutation() {
        let logger = Arc::new(Logger::new("svc"));
        let sink = capture(&logger, "sink");

        std::thread::scope(|s| {
            for _ in 0..4 {
                let logger = logger.clone();
                s.spawn(move || {
                    for i in 0..100 {
                        logger.log(Level::Info, "msg {}", &[&i]);
                    }
                });
            }
            let logger = logger.clone();
            s.spawn(move || {
                for i in 0..100 {
                    let extra = Arc::new(MemoryHandler::new());
                    logger.add_handler(HandlerType::custom(format!("extra-{}", i % 3)), extra);
                    logger.set_min_level(Level::Info);
                }
            });
        });

        assert_eq!(sink.len(), 400);
    }
}
