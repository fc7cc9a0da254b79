//! Shared handler registry and logger cache
//!
//! The [`Manager`] owns exactly one instance per [`HandlerType`] and hands out
//! context-scoped [`Logger`]s that reference those instances. It is the only
//! party that closes shared handlers: on replacement, on removal, and on
//! [`Manager::close`].
//!
//! When wiring a new logger the manager never attaches a built-in handler
//! both standalone and through the stack, so enabling `console` together with
//! a stack that contains the console still emits every message once.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::Config;
use crate::error::{LogError, LogResult};
use crate::handler::{ConsoleHandler, FileHandler, HandlerType, SharedHandler, StackHandler};
use crate::level::Level;
use crate::logger::Logger;

/// Built-in handlers a new logger gets for `config`, in attach order
///
/// - the stack whenever it is enabled
/// - the console when the stack is disabled, or when the console is enabled
///   and not a member of the stack
/// - the file, symmetrically
///
/// Types that are not registered (a file without a path) are skipped by the
/// caller.
pub fn builtin_wiring(config: &Config) -> Vec<HandlerType> {
    let stack = &config.stack;
    let mut types = Vec::with_capacity(3);

    if stack.enabled {
        types.push(HandlerType::Stack);
    }
    if !stack.enabled || (config.console.enabled && !stack.handlers.console) {
        types.push(HandlerType::Console);
    }
    if !stack.enabled || (config.file.enabled && !stack.handlers.file) {
        types.push(HandlerType::File);
    }

    types
}

struct ManagerState {
    /// Owning registry
    handlers: HashMap<HandlerType, SharedHandler>,
    /// Get-or-create cache, never evicted
    loggers: HashMap<String, Arc<Logger>>,
    /// The stack this manager built, as opposed to one registered by a caller
    builtin_stack: Option<SharedHandler>,
}

/// Owner of the shared handlers and the per-context logger cache
///
/// # Example
///
/// ```no_run
/// use logstack_core::{Config, Manager};
///
/// let config = Config::default()
///     .with_console(true, true)
///     .with_file("/var/log/app/app.log", 10 * 1024 * 1024)
///     .with_stack(true, true);
///
/// let manager = Manager::new(config)?;
/// let logger = manager.get_logger("api");
/// logger.info("listening");
///
/// manager.close()?;
/// # Ok::<(), logstack_core::LogError>(())
/// ```
pub struct Manager {
    config: Config,
    min_level: Level,
    state: RwLock<ManagerState>,
}

impl Manager {
    /// Validate `config` and build the console, file and stack handlers
    ///
    /// The file handler is built whenever `file.path` is set, even if only
    /// the stack or nothing uses it; failing to open it is an error.
    pub fn new(config: Config) -> LogResult<Self> {
        let console: SharedHandler = Arc::new(ConsoleHandler::new(config.console.colored));
        Self::with_console(config, console)
    }

    /// Like [`Manager::new`] but with a caller-supplied console handler,
    /// e.g. one writing somewhere other than stdout
    pub fn with_console(config: Config, console: SharedHandler) -> LogResult<Self> {
        config.validate()?;
        let min_level = config.min_level()?;

        let mut handlers: HashMap<HandlerType, SharedHandler> = HashMap::new();
        handlers.insert(HandlerType::Console, console);

        if !config.file.path.trim().is_empty() {
            let file = FileHandler::new(&config.file.path, config.file.max_size)?;
            handlers.insert(HandlerType::File, Arc::new(file));
        }

        let stack: SharedHandler = Arc::new(build_stack(&config, &handlers));
        handlers.insert(HandlerType::Stack, stack.clone());

        Ok(Self {
            config,
            min_level,
            state: RwLock::new(ManagerState {
                handlers,
                loggers: HashMap::new(),
                builtin_stack: Some(stack),
            }),
        })
    }

    /// Configuration this manager was built from
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Minimum level given to new loggers
    pub fn min_level(&self) -> Level {
        self.min_level
    }

    /// Return the logger for `context`, creating and wiring it on first use
    ///
    /// Repeated calls with the same context return the same `Arc`.
    pub fn get_logger(&self, context: &str) -> Arc<Logger> {
        // Fast path: logger exists
        if let Some(logger) = self.state.read().loggers.get(context) {
            return logger.clone();
        }

        // Slow path: create new logger
        let mut state = self.state.write();

        // Double-check (another thread might have created it)
        if let Some(logger) = state.loggers.get(context) {
            return logger.clone();
        }

        let logger = Arc::new(Logger::with_min_level(context, self.min_level));
        for handler_type in builtin_wiring(&self.config) {
            if let Some(handler) = state.handlers.get(&handler_type) {
                logger.add_handler(handler_type, handler.clone());
            }
        }
        for (handler_type, handler) in state.handlers.iter().filter(|(t, _)| !t.is_builtin()) {
            logger.add_handler(handler_type.clone(), handler.clone());
        }

        state.loggers.insert(context.to_string(), logger.clone());
        logger
    }

    /// Register `handler` under `handler_type` and point every existing
    /// logger at it
    ///
    /// A previously registered instance is closed once, after the swap.
    /// Loggers that already reach this type through the built-in stack get
    /// the rebuilt stack instead of a second, standalone reference.
    pub fn add_handler(&self, handler_type: HandlerType, handler: SharedHandler) -> LogResult<()> {
        let replaced = {
            let mut state = self.state.write();
            let replaced = state.handlers.insert(handler_type.clone(), handler.clone());
            if handler_type == HandlerType::Stack {
                state.builtin_stack = None;
            } else {
                self.rebuild_stack(&mut state, &handler_type);
            }

            let via_stack = if self.stack_member(&handler_type) {
                state.builtin_stack.clone()
            } else {
                None
            };
            for logger in state.loggers.values() {
                if let Some(stack) = &via_stack {
                    let attached = logger.handler(&HandlerType::Stack);
                    if attached.is_some_and(|h| same_handler(&h, stack)) {
                        continue;
                    }
                }
                logger.add_handler(handler_type.clone(), handler.clone());
            }
            replaced
        };

        match replaced {
            Some(old) if !same_handler(&old, &handler) => old.close().map_err(LogError::from),
            _ => Ok(()),
        }
    }

    /// Unregister, detach from every logger, and close the handler under
    /// `handler_type`. Returns whether anything was registered.
    pub fn remove_handler(&self, handler_type: &HandlerType) -> LogResult<bool> {
        let removed = {
            let mut state = self.state.write();
            let removed = state.handlers.remove(handler_type);
            if removed.is_some() {
                for logger in state.loggers.values() {
                    logger.detach_handler(handler_type);
                }
                if *handler_type == HandlerType::Stack {
                    state.builtin_stack = None;
                } else {
                    self.rebuild_stack(&mut state, handler_type);
                }
            }
            removed
        };

        match removed {
            Some(handler) => {
                handler.close()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Registered handler under `handler_type`
    pub fn get_handler(&self, handler_type: &HandlerType) -> Option<SharedHandler> {
        self.state.read().handlers.get(handler_type).cloned()
    }

    /// Attach the registered `handler_type` to the existing logger for `context`
    pub fn set_handler(&self, context: &str, handler_type: HandlerType) -> LogResult<()> {
        let state = self.state.read();
        let handler = state
            .handlers
            .get(&handler_type)
            .cloned()
            .ok_or_else(|| LogError::HandlerNotFound(handler_type.clone()))?;
        let logger = state
            .loggers
            .get(context)
            .ok_or_else(|| LogError::LoggerNotFound(context.to_string()))?;

        logger.add_handler(handler_type, handler);
        Ok(())
    }

    /// Contexts with a cached logger, sorted
    pub fn contexts(&self) -> Vec<String> {
        let mut contexts: Vec<_> = self.state.read().loggers.keys().cloned().collect();
        contexts.sort();
        contexts
    }

    /// Registered handler types, sorted
    pub fn handler_types(&self) -> Vec<HandlerType> {
        let mut types: Vec<_> = self.state.read().handlers.keys().cloned().collect();
        types.sort();
        types
    }

    /// Empty the registry and close every handler once
    ///
    /// Every handler is closed even if an earlier one fails; the first error
    /// is returned. Cached loggers keep their (now stale) references.
    pub fn close(&self) -> LogResult<()> {
        let handlers: Vec<(HandlerType, SharedHandler)> = {
            let mut state = self.state.write();
            state.builtin_stack = None;
            state.handlers.drain().collect()
        };

        let mut first_err = None;
        for (_, handler) in handlers {
            if let Err(e) = handler.close() {
                first_err.get_or_insert(e);
            }
        }

        first_err.map_or(Ok(()), |e| Err(e.into()))
    }

    /// Whether the built-in stack is configured to contain `handler_type`
    fn stack_member(&self, handler_type: &HandlerType) -> bool {
        match handler_type {
            HandlerType::Console => self.config.stack.handlers.console,
            HandlerType::File => self.config.stack.handlers.file,
            _ => false,
        }
    }

    /// Replace the built-in stack after one of its potential members changed,
    /// so it never delivers to a closed or unregistered instance
    fn rebuild_stack(&self, state: &mut ManagerState, changed: &HandlerType) {
        if !matches!(changed, HandlerType::Console | HandlerType::File) {
            return;
        }
        let old = match (&state.builtin_stack, state.handlers.get(&HandlerType::Stack)) {
            (Some(builtin), Some(registered)) if same_handler(builtin, registered) => builtin.clone(),
            _ => return,
        };

        let stack: SharedHandler = Arc::new(build_stack(&self.config, &state.handlers));
        state.handlers.insert(HandlerType::Stack, stack.clone());
        state.builtin_stack = Some(stack.clone());

        for logger in state.loggers.values() {
            let attached = logger.handler(&HandlerType::Stack);
            if attached.is_some_and(|h| same_handler(&h, &old)) {
                logger.add_handler(HandlerType::Stack, stack.clone());
            }
        }
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("min_level", &self.min_level)
            .field("handlers", &self.handler_types())
            .field("loggers", &self.contexts())
            .finish()
    }
}

/// Non-owning stack of whichever registered built-ins the config selects
fn build_stack(config: &Config, handlers: &HashMap<HandlerType, SharedHandler>) -> StackHandler {
    let stack = StackHandler::non_owning();
    if config.stack.handlers.console {
        if let Some(console) = handlers.get(&HandlerType::Console) {
            stack.add_handler(console.clone());
        }
    }
    if config.stack.handlers.file {
        if let Some(file) = handlers.get(&HandlerType::File) {
            stack.add_handler(file.clone());
        }
    }
    stack
}

/// Identity comparison that ignores vtable pointers
fn same_handler(a: &SharedHandler, b: &SharedHandler) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}
