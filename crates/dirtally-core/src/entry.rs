//! File and directory entry types.

use std::fs::Metadata;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Kind of file system entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Anything that is not a directory (regular files, and unfollowed links).
    File,
    /// Directory.
    Directory,
}

impl EntryKind {
    /// Check if this is a directory.
    pub fn is_dir(self) -> bool {
        matches!(self, EntryKind::Directory)
    }

    /// Check if this is a file.
    pub fn is_file(self) -> bool {
        matches!(self, EntryKind::File)
    }
}

/// Entry timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    /// Creation time. Equal to `modified` on platforms that do not record it.
    pub created: SystemTime,
    /// Last modification time.
    pub modified: SystemTime,
}

impl Timestamps {
    /// Create timestamps from explicit values.
    pub fn new(created: SystemTime, modified: SystemTime) -> Self {
        Self { created, modified }
    }

    /// Read timestamps from metadata.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
        let created = metadata.created().unwrap_or(modified);
        Self { created, modified }
    }

    /// Whether the entry was changed after it was created.
    pub fn modified_after_creation(&self) -> bool {
        self.created != self.modified
    }
}

/// One entry produced by directory enumeration.
///
/// Consumed immediately by the walker; never stored.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// File name (not full path).
    pub name: CompactString,
    /// Full path, the enumerated directory joined with `name`.
    pub path: PathBuf,
    /// Entry kind.
    pub kind: EntryKind,
    /// Size in bytes; always 0 for directories.
    pub size: u64,
    /// Creation and modification times.
    pub timestamps: Timestamps,
}

impl DirEntry {
    /// Create a file entry.
    pub fn file(
        name: impl Into<CompactString>,
        path: impl Into<PathBuf>,
        size: u64,
        timestamps: Timestamps,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: EntryKind::File,
            size,
            timestamps,
        }
    }

    /// Create a directory entry.
    pub fn directory(
        name: impl Into<CompactString>,
        path: impl Into<PathBuf>,
        timestamps: Timestamps,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: EntryKind::Directory,
            size: 0,
            timestamps,
        }
    }

    /// Build an entry from already-read metadata.
    pub fn from_metadata(
        name: impl Into<CompactString>,
        path: impl Into<PathBuf>,
        metadata: &Metadata,
    ) -> Self {
        let timestamps = Timestamps::from_metadata(metadata);
        if metadata.is_dir() {
            Self::directory(name, path, timestamps)
        } else {
            Self::file(name, path, metadata.len(), timestamps)
        }
    }

    /// Full path as a string for pattern matching and reporting.
    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// Length of the full path in characters.
    pub fn path_len(&self) -> usize {
        self.path.as_os_str().to_string_lossy().chars().count()
    }
}
