//! Directory identity tracking for symlink cycle detection.

use std::collections::HashSet;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

/// Real identity of a directory, independent of the path used to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirIdentity {
    /// Device and inode number.
    Inode { device: u64, inode: u64 },
    /// Canonical path, where inode numbers are unavailable.
    Canonical(PathBuf),
}

impl DirIdentity {
    /// Identify a directory from its (link-resolved) metadata.
    #[cfg(unix)]
    pub fn of(_path: &Path, metadata: &Metadata) -> Option<Self> {
        Some(Self::Inode {
            device: metadata.dev(),
            inode: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    pub fn of(path: &Path, _metadata: &Metadata) -> Option<Self> {
        path.canonicalize().ok().map(Self::Canonical)
    }
}

/// Directories already descended into while following links.
///
/// A directory reached a second time (through a link back into an
/// ancestor, or two links to the same target) is counted but not walked
/// again.
#[derive(Debug, Default)]
pub struct VisitedDirs {
    seen: HashSet<DirIdentity>,
}

impl VisitedDirs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a directory. Returns `true` if this is the first time seeing it.
    pub fn first_visit(&mut self, identity: DirIdentity) -> bool {
        self.seen.insert(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_visit() {
        let mut visited = VisitedDirs::new();
        let id = DirIdentity::Inode {
            device: 1,
            inode: 12345,
        };

        assert!(visited.first_visit(id.clone()));
        assert!(!visited.first_visit(id)); // Second time returns false
    }

    #[test]
    fn test_different_devices() {
        let mut visited = VisitedDirs::new();
        let a = DirIdentity::Inode {
            device: 1,
            inode: 12345,
        };
        let b = DirIdentity::Inode {
            device: 2,
            inode: 12345,
        }; // Same inode, different device

        assert!(visited.first_visit(a));
        assert!(visited.first_visit(b));
    }

    #[test]
    fn test_identity_of_real_directory() {
        let temp = std::env::temp_dir();
        let metadata = std::fs::metadata(&temp).unwrap();
        let first = DirIdentity::of(&temp, &metadata);
        let second = DirIdentity::of(&temp, &metadata);
        assert!(first.is_some());
        assert_eq!(first, second);
    }
}
