//! Scan configuration types.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Default long-path threshold, in characters.
pub const DEFAULT_LONG_PATH_THRESHOLD: usize = 260;

/// Configuration shared by every root of one scan invocation.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Paths longer than this many characters are reported.
    #[builder(default = "DEFAULT_LONG_PATH_THRESHOLD")]
    #[serde(default = "default_long_path_threshold")]
    pub long_path_threshold: usize,

    /// Build the created/modified age histograms.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub age_analysis: bool,

    /// Build the per-extension table.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub extension_analysis: bool,

    /// Only files matched by a pattern rule feed the extension table.
    #[builder(default = "false")]
    #[serde(default)]
    pub extensions_for_matches_only: bool,

    /// Descend through symbolic links to directories.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Number of roots scanned concurrently (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,
}

fn default_true() -> bool {
    true
}

fn default_long_path_threshold() -> usize {
    DEFAULT_LONG_PATH_THRESHOLD
}

fn check_flags(
    long_path_threshold: usize,
    extension_analysis: bool,
    extensions_for_matches_only: bool,
) -> Result<(), String> {
    if long_path_threshold < 1 {
        return Err("Long path threshold must be at least 1".to_string());
    }
    if extensions_for_matches_only && !extension_analysis {
        return Err(
            "Restricting extensions to pattern matches requires extension analysis".to_string(),
        );
    }
    Ok(())
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        check_flags(
            self.long_path_threshold.unwrap_or(DEFAULT_LONG_PATH_THRESHOLD),
            self.extension_analysis.unwrap_or(true),
            self.extensions_for_matches_only.unwrap_or(false),
        )
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Re-check the flag combination, e.g. after deserializing.
    pub fn validate(&self) -> Result<(), ScanError> {
        check_flags(
            self.long_path_threshold,
            self.extension_analysis,
            self.extensions_for_matches_only,
        )
        .map_err(ScanError::invalid_config)
    }

    /// Aggregation toggles handed to each root's accumulator.
    pub fn analysis(&self) -> AnalysisOptions {
        AnalysisOptions {
            age: self.age_analysis,
            extensions: self.extension_analysis,
            extensions_for_matches_only: self.extensions_for_matches_only,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            long_path_threshold: DEFAULT_LONG_PATH_THRESHOLD,
            age_analysis: true,
            extension_analysis: true,
            extensions_for_matches_only: false,
            follow_symlinks: false,
            threads: 0,
        }
    }
}

/// Which optional aggregates a root collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub age: bool,
    pub extensions: bool,
    pub extensions_for_matches_only: bool,
}

impl AnalysisOptions {
    /// Whether a file contributes to the extension table.
    pub fn counts_extension(&self, matched: bool) -> bool {
        self.extensions && (!self.extensions_for_matches_only || matched)
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        ScanConfig::default().analysis()
    }
}

/// A user-supplied label attached to a root and echoed in its report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl FromStr for Tag {
    type Err = ScanError;

    /// Parse `name=value`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok(Self::new(name.trim(), value.trim()))
            }
            _ => Err(ScanError::invalid_config(format!(
                "Tag must look like NAME=VALUE, got '{s}'"
            ))),
        }
    }
}

/// A directory tree selected for scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRoot {
    /// Root directory.
    #[serde(with = "crate::serde_paths::lossy")]
    pub path: PathBuf,

    /// Replace this root with one root per immediate subdirectory.
    #[serde(default)]
    pub expand_children: bool,

    /// Ordered labels copied into the report.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl ScanRoot {
    /// A root scanned as a single tree.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            expand_children: false,
            tags: Vec::new(),
        }
    }

    /// A root whose immediate subdirectories are scanned as separate roots.
    pub fn grouped(path: impl Into<PathBuf>) -> Self {
        Self {
            expand_children: true,
            ..Self::new(path)
        }
    }

    /// Append a tag.
    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(name, value));
        self
    }

    /// Derive the root for one child directory of an expanding root.
    pub fn child(&self, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            expand_children: false,
            tags: self.tags.clone(),
        }
    }

    /// Reject roots that cannot be walked at all.
    pub fn validate(&self) -> Result<(), ScanError> {
        if is_empty_path(&self.path) {
            return Err(ScanError::EmptyRootPath);
        }
        Ok(())
    }
}

fn is_empty_path(path: &Path) -> bool {
    path.as_os_str().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder_defaults() {
        let config = ScanConfig::builder().build().unwrap();
        assert_eq!(config.long_path_threshold, 260);
        assert!(config.age_analysis);
        assert!(config.extension_analysis);
        assert!(!config.extensions_for_matches_only);
        assert_eq!(config.threads, 0);
    }

    #[test]
    fn test_config_rejects_zero_threshold() {
        let result = ScanConfig::builder().long_path_threshold(0usize).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_rejects_restriction_without_extensions() {
        let result = ScanConfig::builder()
            .extension_analysis(false)
            .extensions_for_matches_only(true)
            .build();
        assert!(result.is_err());

        let config = ScanConfig {
            extension_analysis: false,
            extensions_for_matches_only: true,
            ..ScanConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ScanError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_counts_extension() {
        let all = AnalysisOptions::default();
        assert!(all.counts_extension(false));

        let matched_only = AnalysisOptions {
            extensions_for_matches_only: true,
            ..all
        };
        assert!(matched_only.counts_extension(true));
        assert!(!matched_only.counts_extension(false));

        let off = AnalysisOptions {
            extensions: false,
            ..all
        };
        assert!(!off.counts_extension(true));
    }

    #[test]
    fn test_tag_parse() {
        let tag: Tag = "team = storage".parse().unwrap();
        assert_eq!(tag, Tag::new("team", "storage"));
        assert!("novalue".parse::<Tag>().is_err());
        assert!("=x".parse::<Tag>().is_err());
    }

    #[test]
    fn test_root_child_copies_tags() {
        let root = ScanRoot::grouped("/home").with_tag("site", "lab");
        let child = root.child("/home/alice");
        assert!(!child.expand_children);
        assert_eq!(child.tags, root.tags);
        assert!(ScanRoot::new("").validate().is_err());
    }
}
