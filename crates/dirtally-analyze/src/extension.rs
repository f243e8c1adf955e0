//! Per-extension size and count totals.

use compact_str::CompactString;
use indexmap::IndexMap;
use serde::Serialize;

/// Lower-cased extension of a file name, including the leading dot.
///
/// Names without a dot, or ending in one, have the empty extension. A name
/// that starts with its only dot (`.bashrc`) is all extension.
pub fn extension_of(name: &str) -> CompactString {
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => CompactString::new(name[idx..].to_lowercase()),
        _ => CompactString::default(),
    }
}

/// Totals for one extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileExtension {
    pub extension: CompactString,
    pub size: u64,
    pub count: u64,
}

/// Extension totals keyed by extension, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ExtensionTable {
    entries: IndexMap<CompactString, FileExtension>,
}

impl ExtensionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file by name.
    pub fn record(&mut self, name: &str, size: u64) {
        let extension = extension_of(name);
        let entry = self
            .entries
            .entry(extension.clone())
            .or_insert_with(|| FileExtension {
                extension,
                size: 0,
                count: 0,
            });
        entry.size += size;
        entry.count += 1;
    }

    pub fn get(&self, extension: &str) -> Option<&FileExtension> {
        self.entries.get(extension)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by total size, largest first.
    pub fn into_sorted(self) -> Vec<FileExtension> {
        let mut list: Vec<FileExtension> = self.entries.into_values().collect();
        list.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.extension.cmp(&b.extension)));
        list
    }
}
