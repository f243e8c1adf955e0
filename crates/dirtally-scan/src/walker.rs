//! Depth-first directory walker.
//!
//! The walk uses an explicit stack of directory paths instead of recursion,
//! so tree depth never grows the call stack. Each entry is enumerated once
//! and handed to the pattern set and the root's [`StatsAccumulator`].

use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use dirtally_analyze::{ScanReport, StatsAccumulator};
use dirtally_core::{DirEntry, ScanConfig, ScanError, ScanRoot, ScanWarning};
use dirtally_pattern::PatternSet;

use crate::progress::{ProgressTracker, ScanProgress};
use crate::visited::{DirIdentity, VisitedDirs};

/// Walks one root at a time with shared, read-only scan settings.
#[derive(Debug, Clone, Copy)]
pub struct TreeWalker<'a> {
    config: &'a ScanConfig,
    patterns: &'a PatternSet,
    reference_time: SystemTime,
    cancel: Option<&'a CancellationToken>,
    progress_tx: Option<&'a broadcast::Sender<ScanProgress>>,
}

/// An enumerated child plus, when links are followed, its real identity.
struct Child {
    entry: DirEntry,
    identity: Option<DirIdentity>,
}

/// Children read from one directory, plus the first error hit on the way.
struct Listing {
    children: Vec<Child>,
    error: Option<io::Error>,
}

impl<'a> TreeWalker<'a> {
    /// Create a walker.
    ///
    /// `reference_time` is the "now" every age is measured against.
    pub fn new(config: &'a ScanConfig, patterns: &'a PatternSet, reference_time: SystemTime) -> Self {
        Self {
            config,
            patterns,
            reference_time,
            cancel: None,
            progress_tx: None,
        }
    }

    /// Abort walks with [`ScanError::Interrupted`] once `token` is cancelled.
    pub fn with_cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Publish progress snapshots on `tx`.
    pub fn with_progress(mut self, tx: &'a broadcast::Sender<ScanProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Walk `root` and return its frozen statistics.
    ///
    /// Directories that cannot be enumerated are recorded in the report and
    /// skipped; only an invalid root or cancellation fails the walk.
    pub fn walk(&self, root: &ScanRoot) -> Result<ScanReport, ScanError> {
        root.validate()?;

        let start = Instant::now();
        let follow_symlinks = self.config.follow_symlinks;
        let mut stats = StatsAccumulator::new(root.clone(), self.config, self.reference_time);
        let mut progress = ProgressTracker::new(root.path.clone(), start);
        let mut visited = VisitedDirs::new();

        if follow_symlinks {
            if let Some(identity) = fs::metadata(&root.path)
                .ok()
                .and_then(|m| DirIdentity::of(&root.path, &m))
            {
                visited.first_visit(identity);
            }
        }

        let mut stack: Vec<PathBuf> = vec![root.path.clone()];

        while let Some(dir) = stack.pop() {
            if self.cancel.is_some_and(CancellationToken::is_cancelled) {
                debug!(root = %root.path.display(), "walk cancelled");
                return Err(ScanError::Interrupted);
            }

            let Listing { children, error } = match read_children(&dir, follow_symlinks) {
                Ok(listing) => listing,
                Err(err) => {
                    debug!(path = %dir.display(), error = %err, "cannot read directory");
                    stats.record_failure(ScanWarning::from_io(&dir, &err));
                    progress.record_failure();
                    continue;
                }
            };
            if let Some(err) = error {
                warn!(path = %dir.display(), error = %err, "directory only partly read");
                stats.record_failure(ScanWarning::from_io(&dir, &err));
                progress.record_failure();
            }

            for Child { entry, identity } in children {
                let rules = self.patterns.rules_for(entry.kind);
                let matched = if rules.is_empty() {
                    None
                } else {
                    self.patterns
                        .resolve(entry.kind, &entry.name, &entry.path_str())
                };
                stats.record_entry(&entry, matched);

                if entry.kind.is_dir() {
                    progress.record_dir();
                    let descend = match identity {
                        Some(identity) => visited.first_visit(identity),
                        None => true,
                    };
                    if descend {
                        stack.push(entry.path.clone());
                    } else {
                        debug!(path = %entry.path.display(), "directory already visited, not descending");
                    }
                } else {
                    progress.record_file(entry.size);
                }

                if progress.due() {
                    progress.set_current_path(entry.path);
                    self.publish(progress.snapshot(false));
                }
            }
        }

        self.publish(progress.snapshot(true));

        let report = stats.finish(start.elapsed());
        info!(
            root = %root.path.display(),
            files = report.file_count,
            dirs = report.directory_count,
            bytes = report.total_size,
            failures = report.failed_directories.len(),
            elapsed_ms = report.scan_duration_ms,
            "root scanned"
        );
        Ok(report)
    }

    fn publish(&self, snapshot: ScanProgress) {
        if let Some(tx) = self.progress_tx {
            // No subscribers is not an error.
            let _ = tx.send(snapshot);
        }
    }
}

/// Names that refer to the directory itself or its parent.
pub fn is_pseudo_entry(name: &str) -> bool {
    name == "." || name == ".."
}

/// Enumerate the immediate children of `dir`, sorted by name.
///
/// Only a failure to open the directory is an `Err`. Entries that cannot be
/// read are left out and the first such error is kept in the listing. The
/// directory handle is released before returning.
fn read_children(dir: &Path, follow_symlinks: bool) -> io::Result<Listing> {
    let items = fs::read_dir(dir)?;
    Ok(collect_children(items, |item| {
        child_of(dir, &item, follow_symlinks)
    }))
}

/// Build children from raw listing items, keeping whatever could be read.
///
/// `build` returns `Ok(None)` for items that are skipped on purpose.
fn collect_children<T>(
    items: impl IntoIterator<Item = io::Result<T>>,
    mut build: impl FnMut(T) -> io::Result<Option<Child>>,
) -> Listing {
    let mut children = Vec::new();
    let mut error = None;

    for item in items {
        match item.and_then(&mut build) {
            Ok(Some(child)) => children.push(child),
            Ok(None) => {}
            Err(err) if error.is_none() => error = Some(err),
            Err(_) => {}
        }
    }

    children.sort_by(|a, b| a.entry.name.cmp(&b.entry.name));
    Listing { children, error }
}

fn child_of(dir: &Path, item: &fs::DirEntry, follow_symlinks: bool) -> io::Result<Option<Child>> {
    let file_name = item.file_name();
    let name = file_name.to_string_lossy();
    if is_pseudo_entry(&name) {
        return Ok(None);
    }

    let path = dir.join(&file_name);
    let metadata = entry_metadata(item, &path, follow_symlinks)?;
    let identity = if follow_symlinks && metadata.is_dir() {
        DirIdentity::of(&path, &metadata)
    } else {
        None
    };

    Ok(Some(Child {
        entry: DirEntry::from_metadata(&*name, path, &metadata),
        identity,
    }))
}

/// Metadata of an entry; links are resolved only when following them.
///
/// A broken link falls back to the link's own metadata.
fn entry_metadata(item: &fs::DirEntry, path: &Path, follow_symlinks: bool) -> io::Result<Metadata> {
    if follow_symlinks && item.file_type()?.is_symlink() {
        fs::metadata(path).or_else(|_| item.metadata())
    } else {
        item.metadata()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirtally_core::Timestamps;
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("dir1")).unwrap();
        fs::create_dir(root.join("dir2")).unwrap();
        fs::create_dir(root.join("dir1/subdir")).unwrap();

        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join("dir1/file2.txt"), "world world world").unwrap();
        fs::write(root.join("dir1/subdir/file3.TXT"), "test").unwrap();
        fs::write(root.join("dir2/file4.log"), "another file here").unwrap();

        temp
    }

    fn walk(root: &Path, config: &ScanConfig, patterns: &PatternSet) -> ScanReport {
        TreeWalker::new(config, patterns, SystemTime::now())
            .walk(&ScanRoot::new(root))
            .unwrap()
    }

    #[test]
    fn test_basic_walk() {
        let temp = create_test_tree();
        let report = walk(temp.path(), &ScanConfig::default(), &PatternSet::new());

        assert_eq!(report.file_count, 4);
        assert_eq!(report.directory_count, 3);
        assert_eq!(report.total_size, 5 + 17 + 4 + 17);
        assert!(report.failed_directories.is_empty());
        assert_eq!(report.extension(".txt").unwrap().count, 3);
        assert_eq!(report.extension(".log").unwrap().size, 17);
    }

    #[test]
    fn test_largest_file_first_seen_wins() {
        let temp = create_test_tree();
        let report = walk(temp.path(), &ScanConfig::default(), &PatternSet::new());

        // file2.txt and file4.log are both 17 bytes; dir2 is popped first.
        assert_eq!(report.largest_file_size, 17);
        assert_eq!(
            report.largest_file,
            Some(temp.path().join("dir2/file4.log"))
        );
    }

    #[test]
    fn test_empty_root_rejected() {
        let config = ScanConfig::default();
        let patterns = PatternSet::new();
        let walker = TreeWalker::new(&config, &patterns, SystemTime::now());
        assert!(matches!(
            walker.walk(&ScanRoot::new("")),
            Err(ScanError::EmptyRootPath)
        ));
    }

    #[test]
    fn test_missing_root_is_recorded_not_fatal() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let report = walk(&missing, &ScanConfig::default(), &PatternSet::new());

        assert_eq!(report.file_count, 0);
        assert_eq!(report.failed_directories.len(), 1);
        assert_eq!(report.failed_directories[0].path, missing);
    }

    #[test]
    fn test_cancelled_walk() {
        let temp = create_test_tree();
        let config = ScanConfig::default();
        let patterns = PatternSet::new();
        let token = CancellationToken::new();
        token.cancel();

        let result = TreeWalker::new(&config, &patterns, SystemTime::now())
            .with_cancellation(&token)
            .walk(&ScanRoot::new(temp.path()));
        assert!(matches!(result, Err(ScanError::Interrupted)));
    }

    #[test]
    fn test_progress_published_at_end() {
        let temp = create_test_tree();
        let config = ScanConfig::default();
        let patterns = PatternSet::new();
        let (tx, mut rx) = broadcast::channel(16);

        TreeWalker::new(&config, &patterns, SystemTime::now())
            .with_progress(&tx)
            .walk(&ScanRoot::new(temp.path()))
            .unwrap();

        let last = rx.try_recv().unwrap();
        assert!(last.finished);
        assert_eq!(last.files_scanned, 4);
        assert_eq!(last.dirs_scanned, 3);
        assert!(last.elapsed >= Duration::ZERO);
    }

    fn named(name: &str) -> Child {
        let now = SystemTime::now();
        Child {
            entry: DirEntry::file(name, format!("/d/{name}"), 1, Timestamps::new(now, now)),
            identity: None,
        }
    }

    #[test]
    fn test_listing_keeps_entries_around_read_errors() {
        let items = vec![
            Ok("b"),
            Err(io::Error::other("bad sector")),
            Ok("."),
            Ok("a"),
            Err(io::Error::from(io::ErrorKind::PermissionDenied)),
        ];
        let listing = collect_children(items, |name| {
            Ok((!is_pseudo_entry(name)).then(|| named(name)))
        });

        let names: Vec<&str> = listing.children.iter().map(|c| c.entry.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        // Only the first error is kept.
        assert_eq!(listing.error.unwrap().to_string(), "bad sector");
    }

    #[test]
    fn test_listing_records_metadata_failures() {
        let items: Vec<io::Result<&str>> = vec![Ok("kept"), Ok("vanished")];
        let listing = collect_children(items, |name| match name {
            "vanished" => Err(io::Error::from(io::ErrorKind::NotFound)),
            _ => Ok(Some(named(name))),
        });

        assert_eq!(listing.children.len(), 1);
        let warning = ScanWarning::from_io("/d", &listing.error.unwrap());
        assert_eq!(warning.kind, dirtally_core::WarningKind::NotFound);
    }

    #[test]
    fn test_complete_listing_has_no_error() {
        let temp = create_test_tree();
        let listing = read_children(temp.path(), false).unwrap();
        assert!(listing.error.is_none());
        let names: Vec<&str> = listing.children.iter().map(|c| c.entry.name.as_str()).collect();
        assert_eq!(names, vec!["dir1", "dir2", "file1.txt"]);
    }

    #[test]
    fn test_pseudo_entries() {
        assert!(is_pseudo_entry("."));
        assert!(is_pseudo_entry(".."));
        assert!(!is_pseudo_entry("..."));
        assert!(!is_pseudo_entry(".hidden"));
    }
}
