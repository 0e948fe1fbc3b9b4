use std::path::PathBuf;

use clap::Parser;

use crate::utils::parse_size;

#[derive(Debug, Parser)]
#[command(
    name = "reclaim",
    about = "Reclaim disk space on a shared workstation: expire stale files, prune empty folders, empty trash and caches",
    version
)]
pub struct Cli {
    /// Directory holding one home folder per user
    #[arg(long, env = "RECLAIM_USERS_ROOT", default_value = "/Users")]
    pub users_root: PathBuf,

    /// Upper bound on parallel per-user scans
    #[arg(long, env = "RECLAIM_MAX_WORKERS", default_value_t = 4)]
    pub max_workers: usize,

    /// Leave the trash alone
    #[arg(long)]
    pub skip_trash: bool,

    /// Leave cache directories alone
    #[arg(long)]
    pub skip_caches: bool,

    /// Do not run package-manager cleanup commands
    #[arg(long)]
    pub skip_packages: bool,

    /// Seconds before a package-manager command is killed
    #[arg(long, default_value_t = 600)]
    pub command_timeout: u64,

    /// Files above this size untouched for a week are removed (e.g. 500M, 2Gi)
    #[arg(
        long,
        env = "RECLAIM_LARGE_FILE_MIN_SIZE",
        default_value = "500M",
        value_parser = parse_size
    )]
    pub large_file_min_size: u64,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Default tracing filter when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
