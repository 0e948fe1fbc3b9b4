//! reclaim: frees disk space on a shared workstation.
//!
//! The core is the expiry engine: [`policy`] decides which files are stale,
//! [`walker`] applies it to one user's home and prunes emptied folders,
//! [`coordinator`] runs one walk per user on a bounded pool, and
//! [`summary`] folds everything into the final report. Trash, caches and
//! package-manager cleanup live in [`collaborators`].

pub mod cli;
pub mod clock;
pub mod collaborators;
pub mod config;
pub mod coordinator;
pub mod disk_info;
pub mod error;
pub mod fs;
pub mod output;
pub mod policy;
pub mod privilege;
pub mod shell;
pub mod summary;
pub mod utils;
pub mod walker;

pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use coordinator::{ScanCoordinator, ScanOutcome};
pub use error::{CleanError, FsError, Result};
pub use fs::{FileSystem, LocalFs};
pub use policy::{Category, Decision, ExpiryPolicy};
pub use summary::{StatsAggregator, Summary};
pub use walker::{DirectoryWalker, WalkReport, WalkResult};
