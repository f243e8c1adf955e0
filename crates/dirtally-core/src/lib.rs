//! Core types for dirtally.
//!
//! This crate provides the data structures shared by the pattern, analysis
//! and scanning crates: enumerated entries, scan roots, configuration and
//! error types.

mod config;
mod entry;
mod error;
pub mod serde_paths;

pub use config::{
    AnalysisOptions, DEFAULT_LONG_PATH_THRESHOLD, ScanConfig, ScanConfigBuilder, ScanRoot, Tag,
};
pub use entry::{DirEntry, EntryKind, Timestamps};
pub use error::{ScanError, ScanWarning, WarningKind};
