//! End-to-end tests through the public API: config in, files out

use std::fs;
use std::path::Path;
use std::sync::Arc;

use logstack_core::{
    log_warning, Config, FileHandler, Handler, HandlerError, HandlerType, Level, LogError,
    Manager, MemoryHandler, StackHandler,
};
use tempfile::tempdir;

fn backups(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("app.log."))
        .collect();
    names.sort();
    names
}

#[test]
fn test_missing_directory_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("app.log");

    let err = FileHandler::new(&path, 50).unwrap_err();
    assert!(matches!(err, HandlerError::ParentDirMissing { .. }));
    assert!(err.to_string().contains("missing-dir"));
}

#[test]
fn test_yaml_config_to_rotated_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let yaml = format!(
        r#"
level: debug
console:
  enabled: false
file:
  enabled: true
  path: {}
  max_size: 50
"#,
        path.display()
    );

    let config = Config::from_yaml_str(&yaml).unwrap();
    config.validate().unwrap();
    let manager = Manager::new(config).unwrap();
    let logger = manager.get_logger("io");

    logger.debug("one");
    logger.debug("two");
    assert!(backups(dir.path()).is_empty());
    logger.debug("three");

    let names = backups(dir.path());
    assert_eq!(names.len(), 1);
    assert_eq!(names[0].len(), "app.log.".len() + 14);

    let active = fs::read_to_string(&path).unwrap();
    assert_eq!(active.lines().count(), 1);
    assert!(active.ends_with("[DEBUG] [io] three\n"));

    manager.close().unwrap();
}

#[test]
fn test_stack_and_standalone_file_write_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let config = Config::default()
        .with_console(false, false)
        .with_file(path.to_string_lossy(), 0)
        .with_stack(false, true);
    let manager = Manager::new(config).unwrap();

    let logger = manager.get_logger("orders");
    logger.info("x");
    log_warning!(logger, "stock low: {}", 3);

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("[INFO] [orders] x"));
    assert!(lines[1].ends_with("[WARNING] [orders] stock low: 3"));

    manager.close().unwrap();
}

#[test]
fn test_console_once_with_stack() {
    let console = Arc::new(MemoryHandler::new());
    let config = Config::default()
        .with_console(true, false)
        .with_stack(true, false);
    let manager = Manager::with_console(config, console.clone()).unwrap();

    manager.get_logger("app").info("x");

    let hits = console.messages().iter().filter(|m| m.ends_with("x")).count();
    assert_eq!(hits, 1);
}

#[test]
fn test_many_loggers_share_one_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let config = Config::default()
        .with_console(false, false)
        .with_file(path.to_string_lossy(), 0);
    let manager = Manager::new(config).unwrap();

    std::thread::scope(|s| {
        for t in 0..6 {
            let manager = &manager;
            s.spawn(move || {
                let logger = manager.get_logger(&format!("worker-{}", t % 3));
                for i in 0..40 {
                    logger.log(Level::Info, "job {} done", &[&i]);
                }
            });
        }
    });

    assert_eq!(manager.contexts().len(), 3);
    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 240);

    let file = manager.get_handler(&HandlerType::File).unwrap();
    manager.close().unwrap();

    // The shared instance is closed for everyone
    let err = file.log(Level::Info, "late", &[]).unwrap_err();
    assert!(matches!(err, HandlerError::Closed(_)));
}

#[test]
fn test_custom_stack_registration() {
    let a = Arc::new(MemoryHandler::new());
    let b = Arc::new(MemoryHandler::new());
    let config = Config::default().with_console(false, false);
    let manager = Manager::new(config).unwrap();
    let logger = manager.get_logger("fanout");

    let stack = StackHandler::with_handlers(vec![a.clone(), b.clone()]);
    manager
        .add_handler(HandlerType::custom("fanout"), Arc::new(stack))
        .unwrap();
    logger.error("to both");

    assert_eq!(a.messages(), vec!["[fanout] to both".to_string()]);
    assert_eq!(b.messages(), vec!["[fanout] to both".to_string()]);

    // The custom stack owns its members
    manager.close().unwrap();
    assert_eq!(a.close_count(), 1);
    assert_eq!(b.close_count(), 1);
}

#[test]
fn test_invalid_config_never_opens_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let mut config = Config::default().with_file(path.to_string_lossy(), 0);
    config.level = "chatty".to_string();

    let err = Manager::new(config).unwrap_err();
    assert!(matches!(err, LogError::Config(_)));
    assert!(!path.exists());
}
