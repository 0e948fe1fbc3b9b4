//! Cleanup subsystems that run before the per-user scan: trash, caches and
//! package managers. Each is a thin wrapper whose failures are reported as
//! warnings and never stop the run.

mod caches;
mod package_managers;
mod trash;

pub use caches::Caches;
pub use package_managers::PackageManagers;
pub use trash::Trash;

use crate::config::Config;
use crate::shell::ShellExecutor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollaboratorKind {
    Trash,
    Caches,
    PackageManagers,
}

/// What one collaborator did.
#[derive(Debug, Clone)]
pub struct CollaboratorReport {
    pub kind: CollaboratorKind,
    /// Locations emptied or package managers cleaned.
    pub cleared: u64,
    pub bytes_freed: u64,
    pub errors: Vec<String>,
}

impl CollaboratorReport {
    pub fn new(kind: CollaboratorKind) -> Self {
        Self {
            kind,
            cleared: 0,
            bytes_freed: 0,
            errors: Vec::new(),
        }
    }
}

/// The trait every cleanup subsystem implements.
pub trait Collaborator {
    /// Machine-readable name (e.g. "trash").
    fn name(&self) -> &'static str;

    /// Human-readable label for the section header.
    fn label(&self) -> &'static str;

    fn run(&self, shell: &dyn ShellExecutor) -> CollaboratorReport;
}

/// Collaborators enabled by `config`, in run order.
pub fn enabled_collaborators(config: &Config) -> Vec<Box<dyn Collaborator>> {
    let mut all: Vec<Box<dyn Collaborator>> = Vec::new();
    if config.clean_trash {
        all.push(Box::new(Trash::new(
            config.system_trash.clone(),
            config.users_root.clone(),
        )));
    }
    if config.clean_caches {
        all.push(Box::new(Caches::new(config.cache_roots.clone())));
    }
    if config.clean_packages {
        all.push(Box::new(PackageManagers::new(
            config.package_managers.clone(),
        )));
    }
    all
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use crate::error::{CleanError, Result};
    use crate::shell::{CommandOutput, CommandSpec, ShellExecutor};

    /// Records every command and answers from a fixed script.
    #[derive(Default)]
    pub struct FakeShell {
        pub available: Vec<&'static str>,
        pub failing: Vec<&'static str>,
        /// Programs that run but exit with a failure status.
        pub unsuccessful: Vec<&'static str>,
        pub calls: Mutex<Vec<String>>,
    }

    impl ShellExecutor for FakeShell {
        fn run(&self, cmd: &CommandSpec) -> Result<CommandOutput> {
            self.calls.lock().unwrap().push(cmd.display());
            if cmd.program == "which" {
                let found = cmd
                    .args
                    .first()
                    .is_some_and(|p| self.available.contains(&p.as_str()));
                return Ok(CommandOutput {
                    success: found,
                    stdout: if found { "/usr/bin/x".into() } else { String::new() },
                    stderr: String::new(),
                });
            }
            if self.failing.contains(&cmd.program.as_str()) {
                return Err(CleanError::Command {
                    program: cmd.program.clone(),
                    message: "exit status 1".into(),
                });
            }
            if self.unsuccessful.contains(&cmd.program.as_str()) {
                return Ok(CommandOutput {
                    success: false,
                    stdout: String::new(),
                    stderr: "exit status 1".into(),
                });
            }
            Ok(CommandOutput {
                success: true,
                ..CommandOutput::default()
            })
        }
    }
}
