use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{Collaborator, CollaboratorKind, CollaboratorReport};
use crate::shell::{CommandSpec, ShellExecutor};
use crate::utils;

/// Empties the machine-wide trash and every user's `.Trash`.
pub struct Trash {
    system_trash: PathBuf,
    users_root: PathBuf,
    /// Also ask Finder to empty the trash. On by default only on macOS.
    finder: bool,
}

impl Trash {
    pub fn new(system_trash: PathBuf, users_root: PathBuf) -> Self {
        Self {
            system_trash,
            users_root,
            finder: cfg!(target_os = "macos"),
        }
    }

    pub fn with_finder(mut self, finder: bool) -> Self {
        self.finder = finder;
        self
    }

    /// Existing trash directories, system trash first.
    fn locations(&self) -> Vec<PathBuf> {
        let mut locations = vec![self.system_trash.clone()];
        if let Ok(read_dir) = std::fs::read_dir(&self.users_root) {
            let mut user_trashes: Vec<PathBuf> = read_dir
                .flatten()
                .map(|entry| entry.path().join(".Trash"))
                .collect();
            user_trashes.sort();
            locations.extend(user_trashes);
        }
        locations.retain(|p| p.is_dir());
        locations
    }
}

impl Collaborator for Trash {
    fn name(&self) -> &'static str {
        "trash"
    }

    fn label(&self) -> &'static str {
        "Emptying trash"
    }

    fn run(&self, shell: &dyn ShellExecutor) -> CollaboratorReport {
        let mut report = CollaboratorReport::new(CollaboratorKind::Trash);

        for location in self.locations() {
            empty_location(&location, &mut report);
        }

        if self.finder {
            empty_with_finder(shell, &mut report);
        }

        report
    }
}

fn empty_with_finder(shell: &dyn ShellExecutor, report: &mut CollaboratorReport) {
    let cmd =
        CommandSpec::new("osascript").args(["-e", "tell app \"Finder\" to empty trash"]);
    match shell.run(&cmd) {
        Ok(out) if out.success => {}
        Ok(out) => {
            warn!(stderr = %out.stderr, "Finder could not empty the trash");
            report.errors.push(format!("{}: {}", cmd.display(), out.stderr));
        }
        Err(e) => {
            warn!(error = %e, "Finder could not empty the trash");
            report.errors.push(e.to_string());
        }
    }
}

fn empty_location(location: &Path, report: &mut CollaboratorReport) {
    if utils::dir_size(location) == 0 {
        return;
    }
    let (freed, errors) = utils::clear_dir(location);
    debug!(path = %location.display(), freed, "emptied trash");
    report.cleared += 1;
    report.bytes_freed += freed;
    report.errors.extend(errors);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::testing::FakeShell;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn empties_system_and_user_trash() {
        let temp = TempDir::new().unwrap();
        let system = temp.path().join("system-trash");
        let users = temp.path().join("Users");
        fs::create_dir_all(&system).unwrap();
        fs::write(system.join("junk.bin"), vec![0u8; 100]).unwrap();
        fs::create_dir_all(users.join("alice/.Trash/folder")).unwrap();
        fs::write(users.join("alice/.Trash/folder/old.doc"), vec![0u8; 40]).unwrap();
        // empty trash is not counted
        fs::create_dir_all(users.join("bob/.Trash")).unwrap();
        fs::create_dir_all(users.join("carol")).unwrap();

        let report = Trash::new(system.clone(), users.clone())
            .with_finder(false)
            .run(&FakeShell::default());

        assert_eq!(report.kind, CollaboratorKind::Trash);
        assert_eq!(report.cleared, 2);
        assert_eq!(report.bytes_freed, 140);
        assert!(report.errors.is_empty());
        assert!(system.exists());
        assert_eq!(fs::read_dir(users.join("alice/.Trash")).unwrap().count(), 0);
    }

    #[test]
    fn missing_locations_are_ignored() {
        let temp = TempDir::new().unwrap();
        let trash =
            Trash::new(temp.path().join("nope"), temp.path().join("nobody")).with_finder(false);
        assert!(trash.locations().is_empty());
        assert_eq!(trash.run(&FakeShell::default()).cleared, 0);
    }

    #[test]
    fn finder_failure_status_is_reported() {
        let temp = TempDir::new().unwrap();
        let shell = FakeShell {
            unsuccessful: vec!["osascript"],
            ..FakeShell::default()
        };
        let trash =
            Trash::new(temp.path().join("nope"), temp.path().join("nobody")).with_finder(true);

        let report = trash.run(&shell);

        assert_eq!(report.cleared, 0);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("osascript -e"));
        assert!(report.errors[0].ends_with("exit status 1"));
        assert_eq!(shell.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn finder_success_adds_no_error() {
        let temp = TempDir::new().unwrap();
        let shell = FakeShell::default();
        let trash =
            Trash::new(temp.path().join("nope"), temp.path().join("nobody")).with_finder(true);

        assert!(trash.run(&shell).errors.is_empty());
        assert_eq!(shell.calls.lock().unwrap().len(), 1);
    }
}
