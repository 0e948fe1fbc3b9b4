use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const UNITS: [&str; 5] = ["B", "Ki", "Mi", "Gi", "Ti"];

/// Home directory of the invoking user, if it can be determined.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Compute total size of a directory recursively.
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Get size of a file or directory without following symlinks.
pub fn entry_size(path: &Path) -> u64 {
    match path.symlink_metadata() {
        Ok(meta) if meta.is_dir() => dir_size(path),
        Ok(meta) => meta.len(),
        Err(_) => 0,
    }
}

/// Remove a file, symlink or directory tree. Returns bytes freed on success.
pub fn safe_remove(path: &Path) -> Result<u64, std::io::Error> {
    let size = entry_size(path);
    if path.symlink_metadata()?.is_dir() {
        std::fs::remove_dir_all(path)?;
    } else {
        std::fs::remove_file(path)?;
    }
    Ok(size)
}

/// Remove every child of `dir`, keeping `dir` itself.
///
/// Returns bytes freed and the error messages of children that could not be
/// removed.
pub fn clear_dir(dir: &Path) -> (u64, Vec<String>) {
    let mut freed = 0u64;
    let mut errors = Vec::new();

    let read_dir = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            errors.push(format!("Cannot read {}: {e}", dir.display()));
            return (freed, errors);
        }
    };

    for entry in read_dir.flatten() {
        let path = entry.path();
        match safe_remove(&path) {
            Ok(size) => freed += size,
            Err(e) => errors.push(format!("Failed to remove {}: {e}", path.display())),
        }
    }
    (freed, errors)
}

/// Parse a `du`-style size ("512K", "1.5M", "2Gi", "0B", "4096") into bytes.
/// Units are 1024-based.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (num_str, unit) = s.split_at(split);

    if num_str.is_empty() {
        return Err(format!("Invalid size: '{s}'"));
    }

    let unit = unit.trim().to_ascii_uppercase();
    let unit = unit.trim_end_matches('B').trim_end_matches('I');
    let multiplier: u64 = match unit {
        "" => 1,
        "K" => 1 << 10,
        "M" => 1 << 20,
        "G" => 1 << 30,
        "T" => 1 << 40,
        _ => return Err(format!("Unknown unit in '{s}'")),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    Ok((num * multiplier as f64) as u64)
}

/// Format a byte count with binary units and two decimals ("1.50Gi").
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.2}{}", UNITS[unit])
}

/// Shorten a path for display by replacing home dir with ~.
pub fn display_path(path: &Path) -> String {
    match home_dir() {
        Some(home) => match path.strip_prefix(&home) {
            Ok(relative) => format!("~/{}", relative.display()),
            Err(_) => path.display().to_string(),
        },
        None => path.display().to_string(),
    }
}
