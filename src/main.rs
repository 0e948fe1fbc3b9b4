use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reclaim::cli::Cli;
use reclaim::collaborators::enabled_collaborators;
use reclaim::privilege::{require_elevated, EffectiveUid};
use reclaim::shell::SystemShell;
use reclaim::{disk_info, output};
use reclaim::{Config, LocalFs, ScanCoordinator, StatsAggregator, SystemClock};

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = require_elevated(&EffectiveUid) {
        output::print_error(&e.to_string());
        return ExitCode::FAILURE;
    }

    let config = Config::from_cli(&cli);
    run(&config);
    ExitCode::SUCCESS
}

fn run(config: &Config) {
    output::print_banner();
    output::print_disk_space(disk_info::disk_space(Path::new("/")));

    let mut stats = StatsAggregator::new();
    let shell = SystemShell;

    for collaborator in enabled_collaborators(config) {
        output::print_section(collaborator.label());
        let report = collaborator.run(&shell);
        for err in &report.errors {
            output::print_warning(err);
        }
        info!(
            collaborator = collaborator.name(),
            cleared = report.cleared,
            bytes = report.bytes_freed,
            "collaborator finished"
        );
        stats.add_collaborator(&report);
    }

    output::print_section("Scanning user directories");
    let clock = SystemClock;
    let coordinator =
        ScanCoordinator::new(&LocalFs, &clock, config.expiry_policy(), config.max_workers);
    match coordinator.scan(&config.users_root) {
        Ok(outcome) => {
            if outcome.tasks_failed > 0 || outcome.skipped_entries > 0 {
                info!(
                    failed = outcome.tasks_failed,
                    skipped = outcome.skipped_entries,
                    "scan finished with skipped work"
                );
            }
            output::print_walk_results(&outcome.totals);
            stats.add_walk(outcome.totals);
        }
        Err(e) => {
            warn!(error = %e, "user scan did not run");
            output::print_warning(&e.to_string());
        }
    }

    output::print_summary(&stats.finish());
}
