//! Scan progress reporting.

use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Progress information for the root currently being walked.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Root this snapshot belongs to.
    pub root: PathBuf,
    /// Number of files scanned so far.
    pub files_scanned: u64,
    /// Number of directories scanned so far.
    pub dirs_scanned: u64,
    /// Total bytes scanned so far.
    pub bytes_scanned: u64,
    /// Entry most recently processed.
    pub current_path: PathBuf,
    /// Number of directories that could not be read.
    pub failures: u64,
    /// Time elapsed since this root's walk started.
    pub elapsed: Duration,
    /// Whether the root has been fully walked.
    pub finished: bool,
}

impl ScanProgress {
    /// Calculate scan rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_scanned as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Get total items scanned (files + dirs).
    pub fn total_items(&self) -> u64 {
        self.files_scanned + self.dirs_scanned
    }
}

/// Running counters kept by the walker, snapshotted periodically.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    root: PathBuf,
    start_time: Instant,
    files_scanned: u64,
    dirs_scanned: u64,
    bytes_scanned: u64,
    failures: u64,
    current_path: PathBuf,
}

impl ProgressTracker {
    /// Snapshot cadence, in entries.
    pub const INTERVAL: u64 = 1000;

    pub fn new(root: PathBuf, start_time: Instant) -> Self {
        Self {
            current_path: root.clone(),
            root,
            start_time,
            files_scanned: 0,
            dirs_scanned: 0,
            bytes_scanned: 0,
            failures: 0,
        }
    }

    pub fn record_file(&mut self, size: u64) {
        self.files_scanned += 1;
        self.bytes_scanned += size;
    }

    pub fn record_dir(&mut self) {
        self.dirs_scanned += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn set_current_path(&mut self, path: PathBuf) {
        self.current_path = path;
    }

    /// Whether enough entries were processed for another snapshot.
    pub fn due(&self) -> bool {
        let items = self.files_scanned + self.dirs_scanned;
        items > 0 && items % Self::INTERVAL == 0
    }

    pub fn snapshot(&self, finished: bool) -> ScanProgress {
        ScanProgress {
            root: self.root.clone(),
            files_scanned: self.files_scanned,
            dirs_scanned: self.dirs_scanned,
            bytes_scanned: self.bytes_scanned,
            current_path: self.current_path.clone(),
            failures: self.failures,
            elapsed: self.start_time.elapsed(),
            finished,
        }
    }
}
