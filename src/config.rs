//! Run configuration.
//!
//! Retention periods are fixed in [`crate::policy`]; this covers where to
//! look, which subsystems to run and the large-file size floor.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;
use crate::policy::{ExpiryPolicy, LargeFileRule};
use crate::shell::CommandSpec;
use crate::utils;

/// A package manager and the command that prunes its cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManager {
    pub name: &'static str,
    pub cleanup: CommandSpec,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub users_root: PathBuf,
    pub max_workers: usize,
    /// Size a file must exceed before the large-file rule applies.
    pub large_file_min_size: u64,

    pub clean_trash: bool,
    pub clean_caches: bool,
    pub clean_packages: bool,

    /// Machine-wide trash, emptied alongside each user's `.Trash`.
    pub system_trash: PathBuf,
    /// Directories whose contents are purged by the cache cleaner.
    pub cache_roots: Vec<PathBuf>,
    pub package_managers: Vec<PackageManager>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            users_root: PathBuf::from("/Users"),
            max_workers: 4,
            large_file_min_size: LargeFileRule::default().min_size,
            clean_trash: true,
            clean_caches: true,
            clean_packages: true,
            system_trash: PathBuf::from("/.Trash"),
            cache_roots: default_cache_roots(),
            package_managers: default_package_managers(Duration::from_secs(600)),
        }
    }
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            users_root: cli.users_root.clone(),
            max_workers: cli.max_workers.max(1),
            large_file_min_size: cli.large_file_min_size,
            clean_trash: !cli.skip_trash,
            clean_caches: !cli.skip_caches,
            clean_packages: !cli.skip_packages,
            package_managers: default_package_managers(Duration::from_secs(cli.command_timeout)),
            ..Self::default()
        }
    }

    /// Default retention table with this run's large-file floor.
    pub fn expiry_policy(&self) -> ExpiryPolicy {
        ExpiryPolicy {
            large: LargeFileRule {
                min_size: self.large_file_min_size,
                ..LargeFileRule::default()
            },
            ..ExpiryPolicy::default()
        }
    }
}

fn default_cache_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(home) = utils::home_dir() {
        roots.push(home.join("Library/Caches"));
        roots.push(home.join(".cache"));
    }
    roots.push(PathBuf::from("/Library/Caches"));
    roots
}

fn default_package_managers(timeout: Duration) -> Vec<PackageManager> {
    let pm = |name: &'static str, args: &[&str]| PackageManager {
        name,
        cleanup: CommandSpec::new(name)
            .args(args.iter().copied())
            .timeout(timeout),
    };
    vec![
        pm("brew", &["cleanup", "--prune=all"]),
        pm("pip3", &["cache", "purge"]),
        pm("npm", &["cache", "clean", "--force"]),
        pm("docker", &["system", "prune", "-af", "--volumes"]),
    ]
}
