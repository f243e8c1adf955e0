//! Age-based file histograms.
//!
//! Files are counted in every bucket whose threshold (in whole days) is at
//! most the file's age, so each bucket answers "how much data is at least N
//! days old". Creation and modification ages are tracked side by side.

use std::time::{Duration, SystemTime};

use indexmap::IndexMap;
use serde::Serialize;

use dirtally_core::Timestamps;

/// Fixed bucket thresholds, in days.
pub const AGE_THRESHOLDS_DAYS: [u32; 14] = [
    1, 2, 3, 4, 5, 10, 20, 30, 182, 365, 730, 1095, 1460, 1825,
];

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Running byte and file totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SizeAndCount {
    pub size: u64,
    pub count: u64,
}

impl SizeAndCount {
    pub fn add(&mut self, size: u64) {
        self.size += size;
        self.count += 1;
    }
}

/// Totals for files at least `days_ago` days old.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeBucket {
    /// Threshold in days.
    pub days_ago: u32,
    /// Files created at least `days_ago` days ago.
    pub created: SizeAndCount,
    /// Files modified at least `days_ago` days ago, excluding files never
    /// modified after creation.
    pub modified: SizeAndCount,
}

impl AgeBucket {
    /// Create an empty bucket.
    pub fn new(days_ago: u32) -> Self {
        Self {
            days_ago,
            created: SizeAndCount::default(),
            modified: SizeAndCount::default(),
        }
    }
}

/// Cumulative created/modified histogram for one root.
#[derive(Debug, Clone)]
pub struct AgeHistogram {
    reference_time: SystemTime,
    buckets: IndexMap<u32, AgeBucket>,
}

impl AgeHistogram {
    /// Create a histogram pre-seeded with every threshold.
    ///
    /// `reference_time` is the single "now" shared by all roots of a scan.
    pub fn new(reference_time: SystemTime) -> Self {
        let buckets = AGE_THRESHOLDS_DAYS
            .iter()
            .map(|&days| (days, AgeBucket::new(days)))
            .collect();
        Self {
            reference_time,
            buckets,
        }
    }

    /// Add one file.
    pub fn record(&mut self, size: u64, timestamps: &Timestamps) {
        let created_age = age_in_days(self.reference_time, timestamps.created);
        let modified_age = timestamps
            .modified_after_creation()
            .then(|| age_in_days(self.reference_time, timestamps.modified));

        for bucket in self.buckets.values_mut() {
            let threshold = u64::from(bucket.days_ago);
            if threshold <= created_age {
                bucket.created.add(size);
            }
            if modified_age.is_some_and(|age| threshold <= age) {
                bucket.modified.add(size);
            }
        }
    }

    /// Look up a bucket by threshold.
    pub fn bucket(&self, days_ago: u32) -> Option<&AgeBucket> {
        self.buckets.get(&days_ago)
    }

    /// Buckets in ascending threshold order.
    pub fn buckets(&self) -> impl Iterator<Item = &AgeBucket> {
        self.buckets.values()
    }

    pub fn into_buckets(self) -> Vec<AgeBucket> {
        self.buckets.into_values().collect()
    }
}

/// Whole days between `time` and `reference`; future times are 0 days old.
pub fn age_in_days(reference: SystemTime, time: SystemTime) -> u64 {
    reference
        .duration_since(time)
        .unwrap_or(Duration::ZERO)
        .as_secs()
        / SECONDS_PER_DAY
}

/// Format an elapsed scan time as a human-readable string.
pub fn format_elapsed(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 1 {
        format!("{}ms", duration.as_millis())
    } else if secs < 60 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}h {:02}m {:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
