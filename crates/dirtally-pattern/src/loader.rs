//! Pattern file parser.
//!
//! The format is line based. A line starting with `::` is an option block
//! whose tokens (`FILE`, `DIRECTORY`, `SIMPLE`, `REGEX`, `NAME`, `PATH`)
//! apply to every following pattern until the next block:
//!
//! ```text
//! *.tmp
//! :: DIRECTORY SIMPLE NAME
//! node_modules
//! :: FILE REGEX PATH
//! /backup-\d{8}/
//! ```
//!
//! Patterns before the first block are simple file-name patterns. Blank
//! lines are ignored and patterns are trimmed.

use std::path::Path;

use tracing::debug;

use crate::error::PatternError;
use crate::flags::RuleFlags;
use crate::rule::PatternRule;
use crate::set::PatternSet;

/// Marker that introduces an option block.
pub const OPTION_MARKER: &str = "::";

/// Incremental parser for pattern definitions.
#[derive(Debug, Default)]
pub struct PatternFileLoader {
    flags: RuleFlags,
    rules: Vec<PatternRule>,
    line: usize,
}

impl PatternFileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whole document into rules in declaration order.
    pub fn parse_str(text: &str) -> Result<Vec<PatternRule>, PatternError> {
        let mut loader = Self::new();
        for line in text.lines() {
            loader.feed_line(line)?;
        }
        Ok(loader.finish())
    }

    /// Read and parse a pattern file.
    pub fn load(path: impl AsRef<Path>) -> Result<PatternSet, PatternError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PatternError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rules = Self::parse_str(&text)?;
        let set = PatternSet::from_rules(rules);
        debug!(
            path = %path.display(),
            file_rules = set.file_rules().len(),
            directory_rules = set.directory_rules().len(),
            "loaded pattern file"
        );
        Ok(set)
    }

    /// Consume the next line of the document.
    pub fn feed_line(&mut self, line: &str) -> Result<(), PatternError> {
        self.line += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        if let Some(options) = trimmed.strip_prefix(OPTION_MARKER) {
            self.flags =
                RuleFlags::from_tokens(options).map_err(|e| PatternError::at(self.line, e))?;
            return Ok(());
        }

        let rule =
            PatternRule::new(trimmed, self.flags).map_err(|e| PatternError::at(self.line, e))?;
        self.rules.push(rule);
        Ok(())
    }

    /// Finish parsing and return the rules.
    pub fn finish(self) -> Vec<PatternRule> {
        self.rules
    }
}
