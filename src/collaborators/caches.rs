use std::path::PathBuf;

use tracing::debug;

use super::{Collaborator, CollaboratorKind, CollaboratorReport};
use crate::shell::ShellExecutor;
use crate::utils;

/// Purges the contents of the configured cache directories.
pub struct Caches {
    roots: Vec<PathBuf>,
}

impl Caches {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl Collaborator for Caches {
    fn name(&self) -> &'static str {
        "caches"
    }

    fn label(&self) -> &'static str {
        "Cleaning caches"
    }

    fn run(&self, _shell: &dyn ShellExecutor) -> CollaboratorReport {
        let mut report = CollaboratorReport::new(CollaboratorKind::Caches);

        for root in &self.roots {
            if !root.is_dir() || utils::dir_size(root) == 0 {
                continue;
            }
            let (freed, errors) = utils::clear_dir(root);
            debug!(path = %utils::display_path(root), freed, "purged cache");
            report.cleared += 1;
            report.bytes_freed += freed;
            report.errors.extend(errors);
        }

        report
    }
}
