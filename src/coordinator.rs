//! Fans one [`DirectoryWalker`] per user directory out over a bounded rayon
//! pool, then merges the results on the calling thread.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::{CleanError, Result};
use crate::fs::{EntryKind, FileSystem};
use crate::policy::ExpiryPolicy;
use crate::walker::{DirectoryWalker, WalkResult};

/// Merged result of a whole scan.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub totals: WalkResult,
    pub per_user: Vec<(PathBuf, WalkResult)>,
    pub tasks_failed: usize,
    pub skipped_entries: usize,
}

/// What one task handed back at the join barrier.
struct TaskOutcome {
    root: PathBuf,
    result: WalkResult,
    skipped: usize,
    failure: Option<CleanError>,
}

pub struct ScanCoordinator<'a> {
    fs: &'a dyn FileSystem,
    clock: &'a dyn Clock,
    policy: ExpiryPolicy,
    max_workers: usize,
}

impl<'a> ScanCoordinator<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        clock: &'a dyn Clock,
        policy: ExpiryPolicy,
        max_workers: usize,
    ) -> Self {
        Self {
            fs,
            clock,
            policy,
            max_workers: max_workers.max(1),
        }
    }

    /// Every visible directory directly under `users_root`. A missing or
    /// unreadable root yields nothing.
    pub fn discover_user_dirs(&self, users_root: &Path) -> Vec<PathBuf> {
        let entries = match self.fs.list_entries(users_root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(root = %users_root.display(), error = %e, "cannot list users root");
                return Vec::new();
            }
        };

        let mut dirs: Vec<PathBuf> = entries
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable user entry");
                    None
                }
            })
            .filter(|e| e.kind == EntryKind::Dir && !e.name.starts_with('.'))
            .map(|e| e.path)
            .collect();
        dirs.sort();
        dirs
    }

    /// Scan every user directory under `users_root`.
    pub fn scan(&self, users_root: &Path) -> Result<ScanOutcome> {
        let dirs = self.discover_user_dirs(users_root);
        self.scan_dirs(&dirs)
    }

    /// Walk each of `dirs` on its own task and merge the results.
    ///
    /// Fails only if the worker pool cannot be built; a failed task
    /// contributes a zero result.
    pub fn scan_dirs(&self, dirs: &[PathBuf]) -> Result<ScanOutcome> {
        if dirs.is_empty() {
            return Ok(ScanOutcome::default());
        }

        let width = self.max_workers.min(dirs.len());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(width)
            .thread_name(|i| format!("reclaim-walker-{i}"))
            .build()
            .map_err(|e| CleanError::WorkerPool(e.to_string()))?;

        info!(users = dirs.len(), workers = width, "scanning user directories");

        let outcomes: Vec<TaskOutcome> =
            pool.install(|| dirs.par_iter().map(|dir| self.run_task(dir)).collect());

        Ok(merge(outcomes))
    }

    fn run_task(&self, root: &Path) -> TaskOutcome {
        let now = self.clock.now();
        let walker = DirectoryWalker::new(self.fs, &self.policy, now);

        let failure = |reason: String| TaskOutcome {
            root: root.to_path_buf(),
            result: WalkResult::default(),
            skipped: 0,
            failure: Some(CleanError::TaskFailed {
                path: root.to_path_buf(),
                reason,
            }),
        };

        match panic::catch_unwind(AssertUnwindSafe(|| walker.walk(root))) {
            Ok(Ok(report)) => TaskOutcome {
                root: root.to_path_buf(),
                result: report.result,
                skipped: report.skipped.len(),
                failure: None,
            },
            Ok(Err(e)) => failure(e.to_string()),
            Err(_) => failure("walker panicked".to_string()),
        }
    }
}

fn merge(outcomes: Vec<TaskOutcome>) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();
    for task in outcomes {
        if let Some(err) = task.failure {
            warn!(error = %err, "user scan contributed nothing");
            outcome.tasks_failed += 1;
        } else {
            debug!(
                root = %task.root.display(),
                files = task.result.files_removed,
                large = task.result.large_files_removed,
                folders = task.result.empty_folders_removed,
                skipped = task.skipped,
                "user scan finished"
            );
        }
        outcome.totals = outcome.totals.merge(task.result);
        outcome.skipped_entries += task.skipped;
        outcome.per_user.push((task.root, task.result));
    }
    outcome
}
