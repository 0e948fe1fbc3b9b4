//! Per-user directory walk: expires files, then prunes emptied folders.
//!
//! A walk owns exactly one top-level tree. Files are evaluated as they are
//! listed; a directory is considered for pruning only after all of its
//! children (files and subdirectories) have been processed.

use std::ops::Add;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, trace, warn};

use crate::error::FsError;
use crate::fs::{EntryKind, FileSystem, Listing};
use crate::policy::{Decision, ExpiryPolicy, FileObservation};

/// Directories never descended into.
pub const SKIP_DIRS: &[&str] = &["node_modules", "vendor", "build", ".git", ".Trash"];

/// A directory holding only this entry counts as empty.
const IGNORABLE_MARKER: &str = ".DS_Store";

/// Folders at or under a path component with this name are never pruned.
const LIBRARY_COMPONENT: &str = "Library";

/// Tally produced by one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkResult {
    pub files_removed: u64,
    pub bytes_freed_by_expiry: u64,
    pub large_files_removed: u64,
    pub bytes_freed_by_large_rule: u64,
    pub empty_folders_removed: u64,
}

impl WalkResult {
    pub fn merge(self, other: WalkResult) -> WalkResult {
        WalkResult {
            files_removed: self.files_removed + other.files_removed,
            bytes_freed_by_expiry: self.bytes_freed_by_expiry + other.bytes_freed_by_expiry,
            large_files_removed: self.large_files_removed + other.large_files_removed,
            bytes_freed_by_large_rule: self.bytes_freed_by_large_rule
                + other.bytes_freed_by_large_rule,
            empty_folders_removed: self.empty_folders_removed + other.empty_folders_removed,
        }
    }

    pub fn bytes_freed(&self) -> u64 {
        self.bytes_freed_by_expiry + self.bytes_freed_by_large_rule
    }

    pub fn is_empty(&self) -> bool {
        *self == WalkResult::default()
    }
}

impl Add for WalkResult {
    type Output = WalkResult;

    fn add(self, rhs: WalkResult) -> WalkResult {
        self.merge(rhs)
    }
}

impl std::iter::Sum for WalkResult {
    fn sum<I: Iterator<Item = WalkResult>>(iter: I) -> WalkResult {
        iter.fold(WalkResult::default(), WalkResult::merge)
    }
}

/// Which filesystem call an entry was skipped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    List,
    Stat,
    Remove,
    RemoveTree,
}

/// An entry left untouched because its filesystem call failed.
#[derive(Debug)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub op: FsOp,
    pub error: FsError,
}

#[derive(Debug, Default)]
pub struct WalkReport {
    pub result: WalkResult,
    pub skipped: Vec<SkippedEntry>,
}

pub struct DirectoryWalker<'a> {
    fs: &'a dyn FileSystem,
    policy: &'a ExpiryPolicy,
    now: SystemTime,
}

impl<'a> DirectoryWalker<'a> {
    pub fn new(fs: &'a dyn FileSystem, policy: &'a ExpiryPolicy, now: SystemTime) -> Self {
        Self { fs, policy, now }
    }

    /// Walk `root` to completion.
    ///
    /// Fails only if `root` itself cannot be listed; every other failure is
    /// recorded in [`WalkReport::skipped`] and the walk carries on.
    pub fn walk(&self, root: &Path) -> Result<WalkReport, FsError> {
        let listing = self.fs.list_entries(root)?;
        let mut report = WalkReport::default();
        self.process_entries(listing, &mut report);
        Ok(report)
    }

    fn visit_dir(&self, dir: &Path, report: &mut WalkReport) {
        trace!(path = %dir.display(), "scanning");
        match self.fs.list_entries(dir) {
            Ok(listing) => self.process_entries(listing, report),
            Err(error) => {
                skip(report, FsOp::List, error);
                return;
            }
        }
        self.prune_if_empty(dir, report);
    }

    fn process_entries(&self, listing: Listing, report: &mut WalkReport) {
        for entry in listing {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    skip(report, FsOp::Stat, error);
                    continue;
                }
            };
            match entry.kind {
                EntryKind::Dir => {
                    if SKIP_DIRS.contains(&entry.name.as_str()) {
                        continue;
                    }
                    self.visit_dir(&entry.path, report);
                }
                EntryKind::File => self.process_file(&entry.path, report),
                EntryKind::Symlink | EntryKind::Other => {}
            }
        }
    }

    fn process_file(&self, path: &Path, report: &mut WalkReport) {
        trace!(path = %path.display(), "scanning");
        let stat = match self.fs.stat(path) {
            Ok(stat) => stat,
            Err(error) => return skip(report, FsOp::Stat, error),
        };

        let obs = FileObservation::new(path.to_path_buf(), stat.size, stat.last_access);
        let decision = self.policy.decide(&obs, self.now);
        let by_large_rule = match decision {
            Decision::Keep => return,
            Decision::RemoveByCategory => false,
            Decision::RemoveByLarge => true,
        };

        if let Err(error) = self.fs.remove(path) {
            return skip(report, FsOp::Remove, error);
        }

        let result = &mut report.result;
        if by_large_rule {
            result.large_files_removed += 1;
            result.bytes_freed_by_large_rule += obs.size;
        } else {
            result.files_removed += 1;
            result.bytes_freed_by_expiry += obs.size;
        }
        debug!(path = %path.display(), ?decision, size = obs.size, "removed file");
    }

    /// Never called for the walk root.
    fn prune_if_empty(&self, dir: &Path, report: &mut WalkReport) {
        if !is_prunable_location(dir) {
            return;
        }

        let listing = match self.fs.list_entries(dir) {
            Ok(listing) => listing,
            Err(error) => return skip(report, FsOp::List, error),
        };
        // an unreadable child keeps the folder
        let empty = match listing.as_slice() {
            [] => true,
            [Ok(only)] => only.name == IGNORABLE_MARKER,
            _ => false,
        };
        if !empty {
            return;
        }

        match self.fs.remove_tree(dir) {
            Ok(()) => {
                report.result.empty_folders_removed += 1;
                debug!(path = %dir.display(), "removed empty folder");
            }
            Err(error) => skip(report, FsOp::RemoveTree, error),
        }
    }
}

/// Hidden folders and anything under a `Library` folder stay put. The
/// `Library` folder itself is kept as well: an empty `~/Library` is still
/// one the system expects to exist.
fn is_prunable_location(dir: &Path) -> bool {
    let hidden = dir
        .file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(true);
    if hidden {
        return false;
    }
    !dir
        .components()
        .any(|c| matches!(c, Component::Normal(name) if name == LIBRARY_COMPONENT))
}

/// Record an entry left untouched. The path is the one the failing call was
/// made on.
fn skip(report: &mut WalkReport, op: FsOp, error: FsError) {
    let path = error.path().to_path_buf();
    if error.is_transient() {
        debug!(path = %path.display(), ?op, %error, "skipping entry");
    } else {
        warn!(path = %path.display(), ?op, %error, "skipping entry");
    }
    report.skipped.push(SkippedEntry { path, op, error });
}
