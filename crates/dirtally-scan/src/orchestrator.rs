//! Multi-root scan orchestration.

use std::fs;
use std::time::SystemTime;

use rayon::prelude::*;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use dirtally_analyze::ScanReport;
use dirtally_core::{ScanConfig, ScanError, ScanRoot};
use dirtally_pattern::PatternSet;

use crate::progress::ScanProgress;
use crate::walker::TreeWalker;

/// Expands configured roots and walks each one into its own report.
pub struct ScanOrchestrator {
    config: ScanConfig,
    patterns: PatternSet,
    progress_tx: broadcast::Sender<ScanProgress>,
    cancel: CancellationToken,
}

impl ScanOrchestrator {
    /// Create an orchestrator, rejecting invalid flag combinations up front.
    pub fn new(config: ScanConfig, patterns: PatternSet) -> Result<Self, ScanError> {
        config.validate()?;
        let (progress_tx, _) = broadcast::channel(100);
        Ok(Self {
            config,
            patterns,
            progress_tx,
            cancel: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Token that stops in-flight walks at their next directory.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Scan every root, measuring ages against the current time.
    pub fn run(&self, roots: &[ScanRoot]) -> Result<Vec<ScanReport>, ScanError> {
        self.run_at(roots, SystemTime::now())
    }

    /// Scan every root, measuring ages against `reference_time`.
    ///
    /// Reports come back in expanded-root order regardless of how many
    /// roots are walked concurrently.
    pub fn run_at(
        &self,
        roots: &[ScanRoot],
        reference_time: SystemTime,
    ) -> Result<Vec<ScanReport>, ScanError> {
        let roots = expand_roots(roots)?;
        info!(roots = roots.len(), threads = self.config.threads, "starting scan");

        let walker = TreeWalker::new(&self.config, &self.patterns, reference_time)
            .with_cancellation(&self.cancel)
            .with_progress(&self.progress_tx);

        match self.config.threads {
            1 => roots.iter().map(|root| walker.walk(root)).collect(),
            0 => roots.par_iter().map(|root| walker.walk(root)).collect(),
            n => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| ScanError::Other {
                        message: format!("cannot start scan threads: {e}"),
                    })?;
                pool.install(|| roots.par_iter().map(|root| walker.walk(root)).collect())
            }
        }
    }
}

/// Replace every expanding root with one root per immediate subdirectory.
///
/// Children are ordered by name, inherit the parent's tags and are not
/// expanded further. Other roots pass through unchanged.
pub fn expand_roots(roots: &[ScanRoot]) -> Result<Vec<ScanRoot>, ScanError> {
    let mut expanded = Vec::with_capacity(roots.len());

    for root in roots {
        root.validate()?;
        if !root.expand_children {
            expanded.push(root.clone());
            continue;
        }

        let metadata = fs::metadata(&root.path).map_err(|e| ScanError::io(&root.path, e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory {
                path: root.path.clone(),
            });
        }

        let mut children = Vec::new();
        for item in fs::read_dir(&root.path).map_err(|e| ScanError::io(&root.path, e))? {
            let item = item.map_err(|e| ScanError::io(&root.path, e))?;
            let is_dir = item
                .file_type()
                .map_err(|e| ScanError::io(item.path(), e))?
                .is_dir();
            if is_dir {
                children.push(item.path());
            }
        }
        children.sort();

        debug!(
            root = %root.path.display(),
            children = children.len(),
            "expanded grouped root"
        );
        expanded.extend(children.into_iter().map(|path| root.child(path)));
    }

    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_expand_roots() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("beta")).unwrap();
        fs::create_dir(root.join("alpha")).unwrap();
        fs::write(root.join("loose.txt"), "x").unwrap();

        let roots = vec![
            ScanRoot::new("/plain"),
            ScanRoot::grouped(root).with_tag("group", "home"),
        ];
        let expanded = expand_roots(&roots).unwrap();

        let paths: Vec<PathBuf> = expanded.iter().map(|r| r.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/plain"),
                root.join("alpha"),
                root.join("beta")
            ]
        );
        assert!(expanded.iter().all(|r| !r.expand_children));
        assert_eq!(expanded[1].tags, roots[1].tags);
        assert_eq!(expanded[2].tags, roots[1].tags);
    }

    #[test]
    fn test_expand_missing_root_fails() {
        let temp = TempDir::new().unwrap();
        let roots = vec![ScanRoot::grouped(temp.path().join("absent"))];
        assert!(matches!(
            expand_roots(&roots),
            Err(ScanError::NotFound { .. })
        ));
    }

    #[test]
    fn test_expand_rejects_empty_path() {
        assert!(matches!(
            expand_roots(&[ScanRoot::new("")]),
            Err(ScanError::EmptyRootPath)
        ));
    }

    #[test]
    fn test_invalid_config_rejected_before_scan() {
        let config = ScanConfig {
            long_path_threshold: 0,
            ..ScanConfig::default()
        };
        assert!(matches!(
            ScanOrchestrator::new(config, PatternSet::new()),
            Err(ScanError::InvalidConfig { .. })
        ));
    }
}
