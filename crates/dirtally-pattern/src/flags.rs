//! Rule scope, subject and syntax options.

use std::fmt;

use dirtally_core::EntryKind;
use itertools::Itertools;
use strum::{Display, EnumString};

use crate::error::RuleError;

/// One token of an option block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum OptionToken {
    File,
    Directory,
    Simple,
    Regex,
    Name,
    Path,
}

/// How a rule's pattern text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Syntax {
    /// Literal text with optional leading/trailing `*`.
    #[default]
    Simple,
    /// Regular expression, searched anywhere in the subject.
    Regex,
}

/// Validated option set shared by every pattern of one block.
///
/// At least one target (file/directory) and one subject (name/path) is
/// always selected, and exactly one syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleFlags {
    files: bool,
    directories: bool,
    name: bool,
    path: bool,
    syntax: Syntax,
}

impl RuleFlags {
    /// Parse the whitespace-separated tokens following the `::` marker.
    pub fn from_tokens(tokens: &str) -> Result<Self, RuleError> {
        let (mut files, mut directories, mut name, mut path) = (false, false, false, false);
        let (mut simple, mut regex) = (false, false);

        for token in tokens.split_whitespace() {
            let option: OptionToken = token
                .parse()
                .map_err(|_| RuleError::UnknownOption(token.to_string()))?;
            match option {
                OptionToken::File => files = true,
                OptionToken::Directory => directories = true,
                OptionToken::Simple => simple = true,
                OptionToken::Regex => regex = true,
                OptionToken::Name => name = true,
                OptionToken::Path => path = true,
            }
        }

        if !files && !directories {
            return Err(RuleError::MissingTarget);
        }
        let syntax = match (simple, regex) {
            (true, true) => return Err(RuleError::ConflictingSyntax),
            (false, false) => return Err(RuleError::MissingSyntax),
            (true, false) => Syntax::Simple,
            (false, true) => Syntax::Regex,
        };
        if !name && !path {
            return Err(RuleError::MissingSubject);
        }

        Ok(Self {
            files,
            directories,
            name,
            path,
            syntax,
        })
    }

    pub fn applies_to_files(&self) -> bool {
        self.files
    }

    pub fn applies_to_directories(&self) -> bool {
        self.directories
    }

    /// Whether the rule is tested against entries of `kind`.
    pub fn applies_to(&self, kind: EntryKind) -> bool {
        match kind {
            EntryKind::File => self.files,
            EntryKind::Directory => self.directories,
        }
    }

    /// Test the entry's bare name.
    pub fn matches_name(&self) -> bool {
        self.name
    }

    /// Test the entry's full path.
    pub fn matches_path(&self) -> bool {
        self.path
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn is_regex(&self) -> bool {
        self.syntax == Syntax::Regex
    }

    fn tokens(&self) -> impl Iterator<Item = OptionToken> + '_ {
        [
            (self.files, OptionToken::File),
            (self.directories, OptionToken::Directory),
            (self.syntax == Syntax::Simple, OptionToken::Simple),
            (self.syntax == Syntax::Regex, OptionToken::Regex),
            (self.name, OptionToken::Name),
            (self.path, OptionToken::Path),
        ]
        .into_iter()
        .filter_map(|(set, token)| set.then_some(token))
    }
}

/// Options in effect before the first block: simple file-name patterns.
impl Default for RuleFlags {
    fn default() -> Self {
        Self {
            files: true,
            directories: false,
            name: true,
            path: false,
            syntax: Syntax::Simple,
        }
    }
}

/// Canonical token list, e.g. `FILE DIRECTORY REGEX NAME`.
impl fmt::Display for RuleFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens().join(" "))
    }
}
