//! Error types for reclaim.
//!
//! `FsError` is produced by every filesystem call and is always recovered
//! locally by the walker. `CleanError` covers run-level failures; only
//! `NotElevated` stops a run.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// A classified failure of a single filesystem operation.
#[derive(Error, Debug)]
pub enum FsError {
    #[error("permission denied: {}", .path.display())]
    PermissionDenied { path: PathBuf },

    /// The entry disappeared between discovery and action.
    #[error("vanished: {}", .path.display())]
    Vanished { path: PathBuf },

    #[error("busy: {}", .path.display())]
    Busy { path: PathBuf },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Classify an `io::Error` raised while operating on `path`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        if let Some(code) = err.raw_os_error() {
            if code == libc::EBUSY || code == libc::ETXTBSY {
                return FsError::Busy { path };
            }
        }
        match err.kind() {
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path },
            io::ErrorKind::NotFound => FsError::Vanished { path },
            io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => FsError::Busy { path },
            _ => FsError::Io { path, source: err },
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FsError::PermissionDenied { path }
            | FsError::Vanished { path }
            | FsError::Busy { path }
            | FsError::Io { path, .. } => path,
        }
    }

    /// Permission, vanish and lock failures. Everything else is still
    /// skipped by the walker, but logged louder.
    pub fn is_transient(&self) -> bool {
        !matches!(self, FsError::Io { .. })
    }
}

/// Run-level errors.
#[derive(Error, Debug)]
pub enum CleanError {
    #[error("this tool needs root privileges; run it with sudo")]
    NotElevated,

    #[error("`{program}` is not available")]
    CommandUnavailable { program: String },

    #[error("`{program}` failed: {message}")]
    Command { program: String, message: String },

    #[error("`{program}` timed out after {timeout:?}")]
    CommandTimeout { program: String, timeout: Duration },

    #[error("could not start worker pool: {0}")]
    WorkerPool(String),

    #[error("scan of {} failed: {reason}", .path.display())]
    TaskFailed { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, CleanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_io_kinds() {
        let p = Path::new("/tmp/x");
        let denied = FsError::from_io(p, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(denied, FsError::PermissionDenied { .. }));

        let gone = FsError::from_io(p, io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(gone, FsError::Vanished { .. }));
        assert!(gone.is_transient());
        assert_eq!(gone.path(), p);
    }

    #[test]
    fn ebusy_is_busy() {
        let err = FsError::from_io(Path::new("/x"), io::Error::from_raw_os_error(libc::EBUSY));
        assert!(matches!(err, FsError::Busy { .. }));
    }

    #[test]
    fn unknown_errors_are_not_transient() {
        let err = FsError::from_io(Path::new("/x"), io::Error::other("disk on fire"));
        assert!(!err.is_transient());
        assert!(err.to_string().contains("disk on fire"));
    }
}
