//! Directory walking for dirtally.
//!
//! This crate turns a list of configured roots into one [`ScanReport`] per
//! root.
//!
//! # Overview
//!
//! - **Explicit-stack traversal** - deep trees never grow the call stack
//! - **Local failure handling** - unreadable directories are recorded, not fatal
//! - **Per-root parallelism** via rayon, one exclusively owned accumulator per root
//! - **Progress updates** via broadcast channels
//! - **Cycle guard** when following symbolic links
//!
//! # Example
//!
//! ```rust,no_run
//! use dirtally_scan::{ScanConfig, ScanOrchestrator, ScanRoot};
//! use dirtally_pattern::PatternSet;
//!
//! let orchestrator = ScanOrchestrator::new(ScanConfig::default(), PatternSet::new()).unwrap();
//! let reports = orchestrator
//!     .run(&[ScanRoot::new("/srv/data"), ScanRoot::grouped("/home")])
//!     .unwrap();
//!
//! for report in &reports {
//!     println!("{}: {} bytes in {} files", report.root.path.display(), report.total_size, report.file_count);
//! }
//! ```

mod orchestrator;
mod progress;
mod visited;
mod walker;

pub use orchestrator::{ScanOrchestrator, expand_roots};
pub use progress::ScanProgress;
pub use visited::{DirIdentity, VisitedDirs};
pub use walker::{TreeWalker, is_pseudo_entry};

// Re-export core types for convenience
pub use dirtally_analyze::ScanReport;
pub use dirtally_core::{ScanConfig, ScanError, ScanRoot, ScanWarning, Tag, WarningKind};
