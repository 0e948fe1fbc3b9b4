//! Filesystem access used by the walker and coordinator.
//!
//! Every call is fallible and returns a classified [`FsError`], so callers
//! can decide per entry whether to skip it.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::FsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Other,
}

/// One child of a listed directory. `kind` never follows symlinks.
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
    pub name: String,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Copy)]
pub struct FileStat {
    pub size: u64,
    /// Access time, else modification time, else the epoch.
    pub last_access: SystemTime,
}

/// Children of a directory. A child that could not be read is an `Err` in
/// place, so one bad entry never hides its siblings.
pub type Listing = Vec<Result<DirEntry, FsError>>;

pub trait FileSystem: Send + Sync {
    fn stat(&self, path: &Path) -> Result<FileStat, FsError>;
    /// Fails as a whole only when `dir` itself cannot be opened.
    fn list_entries(&self, dir: &Path) -> Result<Listing, FsError>;
    fn remove(&self, path: &Path) -> Result<(), FsError>;
    fn remove_tree(&self, path: &Path) -> Result<(), FsError>;
}

/// The real local filesystem.
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn stat(&self, path: &Path) -> Result<FileStat, FsError> {
        let meta = std::fs::symlink_metadata(path).map_err(|e| FsError::from_io(path, e))?;
        let last_access = meta
            .accessed()
            .or_else(|_| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        Ok(FileStat {
            size: meta.len(),
            last_access,
        })
    }

    fn list_entries(&self, dir: &Path) -> Result<Listing, FsError> {
        let read_dir = std::fs::read_dir(dir).map_err(|e| FsError::from_io(dir, e))?;
        Ok(read_dir.map(|entry| read_entry(dir, entry)).collect())
    }

    fn remove(&self, path: &Path) -> Result<(), FsError> {
        std::fs::remove_file(path).map_err(|e| FsError::from_io(path, e))
    }

    fn remove_tree(&self, path: &Path) -> Result<(), FsError> {
        std::fs::remove_dir_all(path).map_err(|e| FsError::from_io(path, e))
    }
}

fn read_entry(
    dir: &Path,
    entry: std::io::Result<std::fs::DirEntry>,
) -> Result<DirEntry, FsError> {
    let entry = entry.map_err(|e| FsError::from_io(dir, e))?;
    let path = entry.path();
    // may fall back to lstat, which fails if the entry vanished after readdir
    let file_type = entry.file_type().map_err(|e| FsError::from_io(&path, e))?;
    let kind = if file_type.is_symlink() {
        EntryKind::Symlink
    } else if file_type.is_dir() {
        EntryKind::Dir
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    };
    Ok(DirEntry {
        name: entry.file_name().to_string_lossy().into_owned(),
        path,
        kind,
    })
}
