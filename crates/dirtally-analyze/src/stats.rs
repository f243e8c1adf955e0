//! Per-root running statistics.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::trace;

use dirtally_core::{AnalysisOptions, DirEntry, EntryKind, ScanConfig, ScanRoot, ScanWarning};
use dirtally_pattern::PatternRule;

use crate::age::{AgeBucket, AgeHistogram, format_elapsed};
use crate::extension::{ExtensionTable, FileExtension};

/// An entry matched by a pattern rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternMatch {
    /// Text of the matching rule.
    pub rule: String,
    /// Options of the matching rule, e.g. `FILE SIMPLE NAME`.
    pub rule_flags: String,
    #[serde(with = "dirtally_core::serde_paths::lossy")]
    pub path: PathBuf,
    pub kind: EntryKind,
    /// File size; 0 for directories.
    pub size: u64,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl PatternMatch {
    pub fn new(rule: &PatternRule, entry: &DirEntry) -> Self {
        Self {
            rule: rule.text().to_string(),
            rule_flags: rule.flags().to_string(),
            path: entry.path.clone(),
            kind: entry.kind,
            size: entry.size,
            created: utc_clamped(entry.timestamps.created),
            modified: utc_clamped(entry.timestamps.modified),
        }
    }
}

/// Convert a filesystem time, clamping to the range chrono can represent.
///
/// Some filesystems accept timestamps hundreds of thousands of years away.
fn utc_clamped(time: SystemTime) -> DateTime<Utc> {
    let converted = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs())
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, after.subsec_nanos())),
        Err(err) => {
            let before = err.duration();
            i64::try_from(before.as_secs()).ok().and_then(|secs| {
                match before.subsec_nanos() {
                    0 => DateTime::<Utc>::from_timestamp(-secs, 0),
                    nanos => DateTime::<Utc>::from_timestamp(-secs - 1, 1_000_000_000 - nanos),
                }
            })
        }
    };
    converted.unwrap_or(if time > UNIX_EPOCH {
        DateTime::<Utc>::MAX_UTC
    } else {
        DateTime::<Utc>::MIN_UTC
    })
}

/// Largest file seen so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LargestFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Mutable aggregate for one root, fed one entry at a time by the walker.
#[derive(Debug)]
pub struct StatsAccumulator {
    root: ScanRoot,
    options: AnalysisOptions,
    long_path_threshold: usize,
    total_size: u64,
    file_count: u64,
    directory_count: u64,
    largest_file: Option<LargestFile>,
    extensions: ExtensionTable,
    ages: AgeHistogram,
    failed_directories: Vec<ScanWarning>,
    long_paths: Vec<PathBuf>,
    matches: Vec<PatternMatch>,
}

impl StatsAccumulator {
    /// Create an empty accumulator for `root`.
    pub fn new(root: ScanRoot, config: &ScanConfig, reference_time: SystemTime) -> Self {
        Self {
            root,
            options: config.analysis(),
            long_path_threshold: config.long_path_threshold,
            total_size: 0,
            file_count: 0,
            directory_count: 0,
            largest_file: None,
            extensions: ExtensionTable::new(),
            ages: AgeHistogram::new(reference_time),
            failed_directories: Vec::new(),
            long_paths: Vec::new(),
            matches: Vec::new(),
        }
    }

    /// Record one enumerated entry and the rule it resolved to, if any.
    pub fn record_entry(&mut self, entry: &DirEntry, matched: Option<&PatternRule>) {
        if entry.path_len() > self.long_path_threshold {
            self.long_paths.push(entry.path.clone());
        }
        match entry.kind {
            EntryKind::Directory => self.record_directory(entry, matched),
            EntryKind::File => self.record_file(entry, matched),
        }
    }

    fn record_directory(&mut self, entry: &DirEntry, matched: Option<&PatternRule>) {
        self.directory_count += 1;
        if let Some(rule) = matched {
            self.record_match(rule, entry);
        }
    }

    fn record_file(&mut self, entry: &DirEntry, matched: Option<&PatternRule>) {
        self.file_count += 1;
        self.total_size += entry.size;

        if self
            .largest_file
            .as_ref()
            .is_none_or(|largest| entry.size > largest.size)
        {
            self.largest_file = Some(LargestFile {
                path: entry.path.clone(),
                size: entry.size,
            });
        }

        if let Some(rule) = matched {
            self.record_match(rule, entry);
        }

        if self.options.counts_extension(matched.is_some()) {
            self.extensions.record(&entry.name, entry.size);
        }

        if self.options.age {
            self.ages.record(entry.size, &entry.timestamps);
        }
    }

    fn record_match(&mut self, rule: &PatternRule, entry: &DirEntry) {
        trace!(rule = rule.text(), path = %entry.path.display(), "pattern matched");
        self.matches.push(PatternMatch::new(rule, entry));
    }

    /// Record a directory that could not be enumerated.
    pub fn record_failure(&mut self, warning: ScanWarning) {
        trace!(path = %warning.path.display(), kind = ?warning.kind, "directory failed");
        self.failed_directories.push(warning);
    }

    pub fn root(&self) -> &ScanRoot {
        &self.root
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn file_count(&self) -> u64 {
        self.file_count
    }

    pub fn directory_count(&self) -> u64 {
        self.directory_count
    }

    pub fn largest_file(&self) -> Option<&LargestFile> {
        self.largest_file.as_ref()
    }

    pub fn failed_directories(&self) -> &[ScanWarning] {
        &self.failed_directories
    }

    pub fn long_paths(&self) -> &[PathBuf] {
        &self.long_paths
    }

    pub fn matches(&self) -> &[PatternMatch] {
        &self.matches
    }

    pub fn extensions(&self) -> &ExtensionTable {
        &self.extensions
    }

    /// Freeze the accumulator into its report.
    pub fn finish(self, elapsed: Duration) -> ScanReport {
        let (largest_file, largest_file_size) = match self.largest_file {
            Some(largest) => (Some(largest.path), largest.size),
            None => (None, 0),
        };
        let extensions = if self.options.extensions {
            self.extensions.into_sorted()
        } else {
            Vec::new()
        };
        let age_buckets = if self.options.age {
            self.ages.into_buckets()
        } else {
            Vec::new()
        };

        ScanReport {
            root: self.root,
            largest_file,
            largest_file_size,
            total_size: self.total_size,
            file_count: self.file_count,
            directory_count: self.directory_count,
            scan_duration: format_elapsed(elapsed),
            scan_duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            elapsed,
            long_paths: self.long_paths,
            failed_directories: self.failed_directories,
            pattern_matches: self.matches,
            extensions,
            age_buckets,
        }
    }
}

/// Frozen results for one scanned root.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Root descriptor with its tags.
    pub root: ScanRoot,
    /// Path of the largest file.
    #[serde(with = "dirtally_core::serde_paths::lossy_option")]
    pub largest_file: Option<PathBuf>,
    pub largest_file_size: u64,
    pub total_size: u64,
    pub file_count: u64,
    pub directory_count: u64,
    /// Human-readable scan duration.
    pub scan_duration: String,
    pub scan_duration_ms: u64,
    #[serde(skip)]
    pub elapsed: Duration,
    #[serde(with = "dirtally_core::serde_paths::lossy_vec")]
    pub long_paths: Vec<PathBuf>,
    pub failed_directories: Vec<ScanWarning>,
    pub pattern_matches: Vec<PatternMatch>,
    /// Per-extension totals, largest first; empty when disabled.
    pub extensions: Vec<FileExtension>,
    /// Age histogram in ascending threshold order; empty when disabled.
    pub age_buckets: Vec<AgeBucket>,
}

impl ScanReport {
    /// Check if any directory could not be read.
    pub fn has_failures(&self) -> bool {
        !self.failed_directories.is_empty()
    }

    pub fn extension(&self, extension: &str) -> Option<&FileExtension> {
        self.extensions.iter().find(|e| e.extension == extension)
    }

    pub fn age_bucket(&self, days_ago: u32) -> Option<&AgeBucket> {
        self.age_buckets.iter().find(|b| b.days_ago == days_ago)
    }
}
