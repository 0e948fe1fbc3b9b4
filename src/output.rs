use colored::Colorize;

use crate::disk_info::DiskSpace;
use crate::summary::Summary;
use crate::utils::format_size;
use crate::walker::WalkResult;

pub fn print_banner() {
    println!("{}", "----".dimmed());
    println!(
        "{}",
        concat!("reclaim - workstation cleanup v", env!("CARGO_PKG_VERSION"))
            .bold()
            .cyan()
    );
}

pub fn print_disk_space(space: Option<DiskSpace>) {
    let (total, free) = match space {
        Some(s) => (format_size(s.total), format_size(s.free)),
        None => ("?".to_string(), "?".to_string()),
    };
    println!("  Total: {}", total.white());
    println!("  Free:  {}", free.green());
}

pub fn print_section(label: &str) {
    println!();
    println!("{}", format!("{label}...").bold().white());
}

/// Per-walk lines, each only when non-zero.
pub fn print_walk_results(result: &WalkResult) {
    if result.files_removed > 0 {
        println!(
            "  Removed {} files ({})",
            result.files_removed,
            format_size(result.bytes_freed_by_expiry).yellow()
        );
    }
    if result.large_files_removed > 0 {
        println!(
            "  Removed {} large files ({})",
            result.large_files_removed,
            format_size(result.bytes_freed_by_large_rule).yellow()
        );
    }
    if result.empty_folders_removed > 0 {
        println!("  Removed {} empty folders", result.empty_folders_removed);
    }
}

pub fn print_summary(summary: &Summary) {
    println!();
    println!("{}", "============".dimmed());
    println!("{}", "SUMMARY".bold().white());
    println!("{}", "============".dimmed());
    for (label, count) in summary.lines() {
        println!("  {} {:<12} {}", "✓".green(), format!("{label}:"), count);
    }
    println!("  {}", "─".repeat(30).dimmed());
    println!(
        "  {} {}",
        "SPACE SAVED:".bold(),
        format_size(summary.total_bytes_saved()).green().bold()
    );
    println!("{}", "Done".green().bold());
}

pub fn print_warning(msg: &str) {
    println!("  {} {}", "Warning:".red().bold(), msg.red());
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}
