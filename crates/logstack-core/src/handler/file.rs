//! Rotating file handler
//!
//! Appends formatted lines to a single log file. Once the file has grown to
//! `max_size` bytes, the next write first renames it to
//! `<path>.<YYYYMMDDHHMMSS>` and starts over with an empty file at `path`.

use std::ffi::OsString;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::traits::{format_line, render_message, Handler, HandlerError, HandlerResult};
use crate::level::Level;

/// Suffix layout for rotated backups
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Descriptor and byte counter, guarded together so a rotation can never
/// interleave with a partial write
struct FileState {
    file: Option<File>,
    current_size: u64,
}

/// A handler that appends to a log file with size-based rotation
///
/// # Example
///
/// ```no_run
/// use logstack_core::{FileHandler, Handler, Level};
///
/// let handler = FileHandler::new("/var/log/app/app.log", 10 * 1024 * 1024)?;
/// handler.log(Level::Info, "ready", &[])?;
/// # Ok::<(), logstack_core::HandlerError>(())
/// ```
pub struct FileHandler {
    path: PathBuf,
    max_size: u64,
    state: Mutex<FileState>,
}

impl FileHandler {
    /// Open (or create) the log file at `path`
    ///
    /// The parent directory must already exist; it is never created.
    /// `max_size == 0` disables rotation.
    pub fn new(path: impl Into<PathBuf>, max_size: u64) -> HandlerResult<Self> {
        let path = path.into();

        let (file, current_size) = if path.exists() {
            let file = open_append(&path).map_err(|source| HandlerError::Open {
                path: path.clone(),
                source,
            })?;
            let size = file
                .metadata()
                .map_err(|source| HandlerError::Open {
                    path: path.clone(),
                    source,
                })?
                .len();
            (file, size)
        } else {
            let dir = parent_dir(&path);
            if !dir.is_dir() {
                return Err(HandlerError::ParentDirMissing { dir });
            }
            let file = open_append(&path).map_err(|source| {
                if source.kind() == io::ErrorKind::PermissionDenied {
                    HandlerError::DirNotWritable {
                        dir: dir.clone(),
                        source,
                    }
                } else {
                    HandlerError::Open {
                        path: path.clone(),
                        source,
                    }
                }
            })?;
            (file, 0)
        };

        Ok(Self {
            path,
            max_size,
            state: Mutex::new(FileState {
                file: Some(file),
                current_size,
            }),
        })
    }

    /// Path of the active log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rotation threshold in bytes (0 = never rotate)
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Bytes written to the active file since it was opened or rotated
    pub fn current_size(&self) -> u64 {
        self.state.lock().current_size
    }

    /// Whether the descriptor has been released by `close` or a failed rotation
    pub fn is_closed(&self) -> bool {
        self.state.lock().file.is_none()
    }

    /// Name a backup of the active file would get right now
    pub fn backup_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".");
        name.push(chrono::Local::now().format(BACKUP_TIMESTAMP_FORMAT).to_string());
        PathBuf::from(name)
    }

    /// Force a rotation regardless of the current size
    pub fn rotate(&self) -> HandlerResult<()> {
        let mut state = self.state.lock();
        if state.file.is_none() {
            return Err(HandlerError::Closed(self.target()));
        }
        self.rotate_locked(&mut state)
    }

    /// Close, rename, reopen. On failure the handler keeps no descriptor.
    fn rotate_locked(&self, state: &mut FileState) -> HandlerResult<()> {
        let rotate_err = |source| HandlerError::Rotate {
            path: self.path.clone(),
            source,
        };

        if let Some(mut file) = state.file.take() {
            file.flush().map_err(rotate_err)?;
        }

        std::fs::rename(&self.path, self.backup_path()).map_err(rotate_err)?;

        let file = open_append(&self.path).map_err(rotate_err)?;
        state.file = Some(file);
        state.current_size = 0;
        Ok(())
    }

    fn target(&self) -> String {
        self.path.display().to_string()
    }
}

impl Handler for FileHandler {
    fn log(&self, level: Level, message: &str, args: &[&dyn fmt::Display]) -> HandlerResult<()> {
        let message = render_message(message, args)?;

        let mut state = self.state.lock();
        if state.file.is_none() {
            return Err(HandlerError::Closed(self.target()));
        }

        if self.max_size > 0 && state.current_size >= self.max_size {
            self.rotate_locked(&mut state)?;
        }

        let line = format_line(level, &message, false);
        let file = state
            .file
            .as_mut()
            .ok_or_else(|| HandlerError::Closed(self.target()))?;
        file.write_all(line.as_bytes())
            .map_err(|e| HandlerError::write(self.target(), e))?;

        state.current_size += line.len() as u64;
        Ok(())
    }

    fn close(&self) -> HandlerResult<()> {
        let mut state = self.state.lock();
        match state.file.take() {
            Some(mut file) => file
                .flush()
                .map_err(|e| HandlerError::close(self.target(), e)),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for FileHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("FileHandler")
            .field("path", &self.path)
            .field("max_size", &self.max_size)
            .field("current_size", &state.current_size)
            .field("closed", &state.file.is_none())
            .finish()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Directory the file lives in; a bare file name lives in the current directory
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
