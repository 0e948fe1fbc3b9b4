//! Expiry policy: maps file metadata to a category and a removal decision.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const DAY: u64 = 86_400;

/// Coarse file-type classification used to pick a retention period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Dmg,
    Media,
    Images,
    Documents,
    Archives,
    Other,
}

/// Extension table, in match order. `Other` has no extensions and is the
/// fallback.
const EXTENSIONS: &[(Category, &[&str])] = &[
    (Category::Dmg, &[".dmg"]),
    (
        Category::Media,
        &[".mov", ".mp4", ".m4a", ".wav", ".mp3", ".aac"],
    ),
    (
        Category::Images,
        &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".webp"],
    ),
    (
        Category::Documents,
        &[".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".txt"],
    ),
    (
        Category::Archives,
        &[".zip", ".rar", ".7z", ".tar", ".gz", ".bz2"],
    ),
];

/// Path fragments marking bundle, framework and system content. These only
/// exempt a file from the large-file rule; category expiry still applies.
const SYSTEM_SKIP_PATTERNS: &[&str] = &[".app/", ".framework/", ".dylib", ".kext", "/System/"];

/// Classify a path by its lowercased suffix. First match wins.
pub fn classify(path: &Path) -> Category {
    let lower = path.to_string_lossy().to_lowercase();
    EXTENSIONS
        .iter()
        .find(|(_, exts)| exts.iter().any(|ext| lower.ends_with(ext)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

pub fn is_system_path(path: &Path) -> bool {
    let s = path.to_string_lossy();
    SYSTEM_SKIP_PATTERNS.iter().any(|p| s.contains(p))
}

/// Retention period per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryTable {
    pub dmg_days: u64,
    pub media_days: u64,
    pub images_days: u64,
    pub documents_days: u64,
    pub archives_days: u64,
    pub other_days: u64,
}

impl Default for ExpiryTable {
    fn default() -> Self {
        Self {
            dmg_days: 1,
            media_days: 1,
            images_days: 3,
            documents_days: 5,
            archives_days: 7,
            other_days: 30,
        }
    }
}

impl ExpiryTable {
    pub fn retention_days(&self, category: Category) -> u64 {
        match category {
            Category::Dmg => self.dmg_days,
            Category::Media => self.media_days,
            Category::Images => self.images_days,
            Category::Documents => self.documents_days,
            Category::Archives => self.archives_days,
            Category::Other => self.other_days,
        }
    }

    pub fn retention(&self, category: Category) -> Duration {
        Duration::from_secs(self.retention_days(category) * DAY)
    }
}

/// Size-and-age rule applied independently of category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LargeFileRule {
    pub min_size: u64,
    pub period: Duration,
}

impl Default for LargeFileRule {
    /// 500 MiB, untouched for 7 days.
    fn default() -> Self {
        Self {
            min_size: 500 * 1024 * 1024,
            period: Duration::from_secs(7 * DAY),
        }
    }
}

/// What the walker saw for one regular file.
#[derive(Debug, Clone)]
pub struct FileObservation {
    pub path: PathBuf,
    pub size: u64,
    pub last_access: SystemTime,
    pub category: Category,
}

impl FileObservation {
    pub fn new(path: PathBuf, size: u64, last_access: SystemTime) -> Self {
        let category = classify(&path);
        Self {
            path,
            size,
            last_access,
            category,
        }
    }

    /// Time since last access. A timestamp in the future counts as zero.
    pub fn age(&self, now: SystemTime) -> Duration {
        now.duration_since(self.last_access).unwrap_or(Duration::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    RemoveByCategory,
    RemoveByLarge,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpiryPolicy {
    pub table: ExpiryTable,
    pub large: LargeFileRule,
}

impl ExpiryPolicy {
    /// Category expiry is checked first and wins even for large files.
    pub fn decide(&self, obs: &FileObservation, now: SystemTime) -> Decision {
        let age = obs.age(now);
        if age > self.table.retention(obs.category) {
            return Decision::RemoveByCategory;
        }
        if obs.size > self.large.min_size && age > self.large.period && !is_system_path(&obs.path)
        {
            return Decision::RemoveByLarge;
        }
        Decision::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    fn days_ago(now: SystemTime, days: u64) -> SystemTime {
        now - Duration::from_secs(days * DAY)
    }

    fn obs(path: &str, size: u64, last_access: SystemTime) -> FileObservation {
        FileObservation::new(PathBuf::from(path), size, last_access)
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(classify(Path::new("/Users/a/Photo.JPG")), Category::Images);
        assert_eq!(classify(Path::new("/Users/a/setup.dmg")), Category::Dmg);
        assert_eq!(classify(Path::new("/Users/a/song.MP3")), Category::Media);
        assert_eq!(classify(Path::new("/Users/a/notes.txt")), Category::Documents);
        assert_eq!(classify(Path::new("/Users/a/backup.tar.gz")), Category::Archives);
    }

    #[test]
    fn classify_falls_back_to_other() {
        assert_eq!(classify(Path::new("/Users/a/archive.dat")), Category::Other);
        assert_eq!(classify(Path::new("/Users/a/Makefile")), Category::Other);
        // suffix match, not substring
        assert_eq!(classify(Path::new("/Users/a/photo.jpg.part")), Category::Other);
    }

    #[test]
    fn retention_table_values() {
        let t = ExpiryTable::default();
        assert_eq!(t.retention_days(Category::Dmg), 1);
        assert_eq!(t.retention_days(Category::Media), 1);
        assert_eq!(t.retention_days(Category::Images), 3);
        assert_eq!(t.retention_days(Category::Documents), 5);
        assert_eq!(t.retention_days(Category::Archives), 7);
        assert_eq!(t.retention_days(Category::Other), 30);
    }

    #[test]
    fn stale_image_is_removed_by_category() {
        let now = SystemTime::now();
        let policy = ExpiryPolicy::default();
        let o = obs("/Users/a/photo.jpg", 2 * MIB, days_ago(now, 4));
        assert_eq!(policy.decide(&o, now), Decision::RemoveByCategory);
    }

    #[test]
    fn fresh_document_is_kept() {
        let now = SystemTime::now();
        let policy = ExpiryPolicy::default();
        let o = obs("/Users/a/report.pdf", 10_000, days_ago(now, 4));
        assert_eq!(policy.decide(&o, now), Decision::Keep);
    }

    #[test]
    fn category_rule_takes_precedence_over_large_rule() {
        let now = SystemTime::now();
        let policy = ExpiryPolicy::default();
        let o = obs("/Users/a/movie.mov", 600 * MIB, days_ago(now, 8));
        assert_eq!(policy.decide(&o, now), Decision::RemoveByCategory);
    }

    #[test]
    fn large_unexpired_file_is_removed_by_large_rule() {
        let now = SystemTime::now();
        let policy = ExpiryPolicy::default();
        let o = obs("/Users/a/archive.dat", 600 * MIB, days_ago(now, 8));
        assert_eq!(policy.decide(&o, now), Decision::RemoveByLarge);
    }

    #[test]
    fn large_rule_needs_both_size_and_age() {
        let now = SystemTime::now();
        let policy = ExpiryPolicy::default();
        let small = obs("/Users/a/archive.dat", 100 * MIB, days_ago(now, 8));
        assert_eq!(policy.decide(&small, now), Decision::Keep);
        let recent = obs("/Users/a/archive.dat", 600 * MIB, days_ago(now, 6));
        assert_eq!(policy.decide(&recent, now), Decision::Keep);
        let exact = obs("/Users/a/archive.dat", 500 * MIB, days_ago(now, 8));
        assert_eq!(policy.decide(&exact, now), Decision::Keep);
    }

    #[test]
    fn system_paths_are_exempt_from_large_rule_only() {
        let now = SystemTime::now();
        let policy = ExpiryPolicy::default();

        let big = obs("/Users/a/Tools.app/Contents/blob.dat", 600 * MIB, days_ago(now, 8));
        assert_eq!(policy.decide(&big, now), Decision::Keep);

        let expired = obs("/Users/a/Tools.app/Contents/icon.png", 1024, days_ago(now, 4));
        assert_eq!(policy.decide(&expired, now), Decision::RemoveByCategory);
    }

    #[test]
    fn future_access_time_counts_as_fresh() {
        let now = SystemTime::now();
        let policy = ExpiryPolicy::default();
        let o = obs("/Users/a/setup.dmg", 1, now + Duration::from_secs(3600));
        assert_eq!(o.age(now), Duration::ZERO);
        assert_eq!(policy.decide(&o, now), Decision::Keep);
    }

    #[test]
    fn system_path_patterns() {
        assert!(is_system_path(Path::new("/Users/a/X.framework/Versions/A/X")));
        assert!(is_system_path(Path::new("/Users/a/lib/libfoo.dylib")));
        assert!(is_system_path(Path::new("/Users/a/System/blob")));
        assert!(!is_system_path(Path::new("/Users/a/application/blob")));
    }
}
