//! Final tally of a run: walk results plus collaborator counters.

use crate::collaborators::{CollaboratorKind, CollaboratorReport};
use crate::walker::WalkResult;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub walk: WalkResult,
    pub trash_entries_cleared: u64,
    pub caches_cleared: u64,
    pub package_managers_cleaned: u64,
    pub collaborator_bytes_freed: u64,
}

impl Summary {
    pub fn total_bytes_saved(&self) -> u64 {
        self.collaborator_bytes_freed + self.walk.bytes_freed()
    }

    /// `(label, count)` rows in report order, zero counts omitted.
    pub fn lines(&self) -> Vec<(&'static str, u64)> {
        [
            ("Trash", self.trash_entries_cleared),
            ("Caches", self.caches_cleared),
            ("Packages", self.package_managers_cleaned),
            ("Files", self.walk.files_removed),
            ("Large Files", self.walk.large_files_removed),
            ("Folders", self.walk.empty_folders_removed),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect()
    }
}

/// Folds results into a [`Summary`]. Purely additive.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    summary: Summary,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_walk(&mut self, result: WalkResult) {
        self.summary.walk = self.summary.walk.merge(result);
    }

    pub fn add_collaborator(&mut self, report: &CollaboratorReport) {
        let counter = match report.kind {
            CollaboratorKind::Trash => &mut self.summary.trash_entries_cleared,
            CollaboratorKind::Caches => &mut self.summary.caches_cleared,
            CollaboratorKind::PackageManagers => &mut self.summary.package_managers_cleaned,
        };
        *counter += report.cleared;
        self.summary.collaborator_bytes_freed += report.bytes_freed;
    }

    pub fn finish(self) -> Summary {
        self.summary
    }
}
