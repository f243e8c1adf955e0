//! Statistics accumulators for dirtally.
//!
//! A [`StatsAccumulator`] is created per scanned root and fed every entry
//! exactly once. It maintains, without re-reading anything from disk:
//!
//! - **Totals** - size, file and directory counts, largest file
//! - **Extension table** - size and count per lower-cased extension
//! - **Age histogram** - cumulative created/modified buckets
//! - **Lists** - long paths, unreadable directories, pattern matches
//!
//! ```rust
//! use std::time::{Duration, SystemTime};
//! use dirtally_analyze::StatsAccumulator;
//! use dirtally_core::{DirEntry, ScanConfig, ScanRoot, Timestamps};
//!
//! let now = SystemTime::now();
//! let mut stats = StatsAccumulator::new(ScanRoot::new("/data"), &ScanConfig::default(), now);
//!
//! let old = now - Duration::from_secs(40 * 24 * 60 * 60);
//! stats.record_entry(&DirEntry::file("a.log", "/data/a.log", 512, Timestamps::new(old, old)), None);
//!
//! let report = stats.finish(Duration::from_millis(3));
//! assert_eq!(report.total_size, 512);
//! assert_eq!(report.age_bucket(30).unwrap().created.count, 1);
//! ```

pub mod age;
mod extension;
mod stats;

pub use age::{
    AGE_THRESHOLDS_DAYS, AgeBucket, AgeHistogram, SizeAndCount, age_in_days, format_elapsed,
};
pub use extension::{ExtensionTable, FileExtension, extension_of};
pub use stats::{LargestFile, PatternMatch, ScanReport, StatsAccumulator};

// Re-export core types
pub use dirtally_core::{DirEntry, EntryKind, ScanConfig, ScanRoot, Timestamps};
