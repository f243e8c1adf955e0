//! Pattern grammar errors.

use std::path::PathBuf;

use thiserror::Error;

/// Why a single option block or pattern literal was rejected.
#[derive(Debug, Error)]
pub enum RuleError {
    /// Option token outside FILE/DIRECTORY/SIMPLE/REGEX/NAME/PATH.
    #[error("unknown option '{0}'")]
    UnknownOption(String),

    /// Neither FILE nor DIRECTORY was selected.
    #[error("option block must select FILE and/or DIRECTORY")]
    MissingTarget,

    /// Neither NAME nor PATH was selected.
    #[error("option block must select NAME and/or PATH")]
    MissingSubject,

    /// Neither SIMPLE nor REGEX was selected.
    #[error("option block must select SIMPLE or REGEX")]
    MissingSyntax,

    /// Both SIMPLE and REGEX were selected.
    #[error("SIMPLE and REGEX cannot be combined")]
    ConflictingSyntax,

    /// A simple pattern made of nothing but `*`.
    #[error("pattern '{0}' consists only of wildcards")]
    OnlyWildcards(String),

    /// A `*` somewhere other than the first or last character.
    #[error("pattern '{0}' may only have wildcards at its start and end")]
    MisplacedWildcard(String),

    /// A regular expression that does not compile.
    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors loading a pattern file.
#[derive(Debug, Error)]
pub enum PatternError {
    /// A grammar error at a 1-based line.
    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: RuleError },

    /// The pattern file could not be read.
    #[error("failed to read pattern file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PatternError {
    pub(crate) fn at(line: usize, reason: RuleError) -> Self {
        Self::Syntax { line, reason }
    }

    /// Line the error was found on, if it came from the grammar.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. } => Some(*line),
            Self::Io { .. } => None,
        }
    }
}
