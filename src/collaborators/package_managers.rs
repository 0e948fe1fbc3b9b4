use tracing::{debug, warn};

use super::{Collaborator, CollaboratorKind, CollaboratorReport};
use crate::config::PackageManager;
use crate::shell::ShellExecutor;

/// Runs each installed package manager's own cleanup command.
pub struct PackageManagers {
    managers: Vec<PackageManager>,
}

impl PackageManagers {
    pub fn new(managers: Vec<PackageManager>) -> Self {
        Self { managers }
    }
}

impl Collaborator for PackageManagers {
    fn name(&self) -> &'static str {
        "package-managers"
    }

    fn label(&self) -> &'static str {
        "Cleaning package managers"
    }

    fn run(&self, shell: &dyn ShellExecutor) -> CollaboratorReport {
        let mut report = CollaboratorReport::new(CollaboratorKind::PackageManagers);

        for pm in &self.managers {
            if !shell.is_available(pm.name) {
                debug!(manager = pm.name, "not installed");
                continue;
            }
            match shell.run(&pm.cleanup) {
                Ok(out) if out.success => {
                    debug!(command = %pm.cleanup.display(), "package cleanup done");
                    report.cleared += 1;
                }
                Ok(out) => {
                    warn!(command = %pm.cleanup.display(), stderr = %out.stderr, "package cleanup failed");
                    report
                        .errors
                        .push(format!("{}: {}", pm.cleanup.display(), out.stderr));
                }
                Err(e) => {
                    warn!(error = %e, "package cleanup failed");
                    report.errors.push(e.to_string());
                }
            }
        }

        report
    }
}
