//! Individual pattern rules.

use regex::{Regex, RegexBuilder};

use dirtally_core::EntryKind;

use crate::error::RuleError;
use crate::flags::{RuleFlags, Syntax};

const WILDCARD: char = '*';

/// Compiled form of a rule's pattern text.
///
/// Simple patterns are decomposed once into a lower-cased needle and a
/// shape; all comparisons are case-insensitive.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// `text`: whole subject equals the needle.
    Literal(String),
    /// `text*`: subject starts with the needle.
    Prefix(String),
    /// `*text`: subject ends with the needle.
    Suffix(String),
    /// `*text*`: needle appears anywhere in the subject.
    Contains(String),
    /// Case-insensitive regular expression, unanchored.
    Regex(Regex),
}

impl Matcher {
    /// Decompose a simple wildcard pattern.
    pub fn wildcard(pattern: &str) -> Result<Self, RuleError> {
        if pattern.chars().all(|c| c == WILDCARD) {
            return Err(RuleError::OnlyWildcards(pattern.to_string()));
        }

        let leading = pattern.starts_with(WILDCARD);
        let trailing = pattern.ends_with(WILDCARD);
        let start = usize::from(leading);
        let end = pattern.len() - usize::from(trailing);
        let needle = &pattern[start..end];

        if needle.contains(WILDCARD) {
            return Err(RuleError::MisplacedWildcard(pattern.to_string()));
        }

        let needle = needle.to_lowercase();
        Ok(match (leading, trailing) {
            (false, false) => Self::Literal(needle),
            (false, true) => Self::Prefix(needle),
            (true, false) => Self::Suffix(needle),
            (true, true) => Self::Contains(needle),
        })
    }

    /// Compile a case-insensitive regular expression.
    pub fn regex(pattern: &str) -> Result<Self, RuleError> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(Self::Regex)
            .map_err(|source| RuleError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Test one subject string.
    pub fn is_match(&self, subject: &str) -> bool {
        match self {
            Self::Regex(regex) => regex.is_match(subject),
            Self::Literal(needle) => subject.to_lowercase() == *needle,
            Self::Prefix(needle) => subject.to_lowercase().starts_with(needle.as_str()),
            Self::Suffix(needle) => subject.to_lowercase().ends_with(needle.as_str()),
            Self::Contains(needle) => subject.to_lowercase().contains(needle.as_str()),
        }
    }
}

/// One parsed pattern together with the options of its block.
#[derive(Debug, Clone)]
pub struct PatternRule {
    text: String,
    flags: RuleFlags,
    matcher: Matcher,
}

impl PatternRule {
    /// Build a rule from trimmed pattern text.
    pub fn new(text: impl Into<String>, flags: RuleFlags) -> Result<Self, RuleError> {
        let text = text.into();
        let matcher = match flags.syntax() {
            Syntax::Simple => Matcher::wildcard(&text)?,
            Syntax::Regex => Matcher::regex(&text)?,
        };
        Ok(Self {
            text,
            flags,
            matcher,
        })
    }

    /// Pattern text as written.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn flags(&self) -> RuleFlags {
        self.flags
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn applies_to(&self, kind: EntryKind) -> bool {
        self.flags.applies_to(kind)
    }

    /// Test the configured subjects; either one matching is enough.
    pub fn is_match(&self, name: &str, path: &str) -> bool {
        (self.flags.matches_name() && self.matcher.is_match(name))
            || (self.flags.matches_path() && self.matcher.is_match(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(pattern: &str) -> Matcher {
        Matcher::wildcard(pattern).unwrap()
    }

    #[test]
    fn test_wildcard_shapes() {
        assert!(matches!(simple("abc"), Matcher::Literal(_)));
        assert!(matches!(simple("abc*"), Matcher::Prefix(_)));
        assert!(matches!(simple("*abc"), Matcher::Suffix(_)));
        assert!(matches!(simple("*abc*"), Matcher::Contains(_)));
    }

    #[test]
    fn test_wildcard_matching() {
        assert!(simple("*abc*").is_match("xabcx"));
        assert!(simple("abc*").is_match("abcxyz"));
        assert!(!simple("abc*").is_match("xabc"));
        assert!(simple("*abc").is_match("xyzabc"));
        assert!(!simple("*abc").is_match("abcxyz"));
        assert!(simple("report.tmp").is_match("REPORT.TMP"));
        assert!(!simple("report.tmp").is_match("report.tmp.bak"));
        assert!(simple("*ABC*").is_match("xabcx"));
    }

    #[test]
    fn test_invalid_wildcards() {
        assert!(matches!(
            Matcher::wildcard("*"),
            Err(RuleError::OnlyWildcards(_))
        ));
        assert!(matches!(
            Matcher::wildcard("***"),
            Err(RuleError::OnlyWildcards(_))
        ));
        assert!(matches!(
            Matcher::wildcard("a*b"),
            Err(RuleError::MisplacedWildcard(_))
        ));
        assert!(matches!(
            Matcher::wildcard("**abc"),
            Err(RuleError::MisplacedWildcard(_))
        ));
    }

    #[test]
    fn test_regex_is_unanchored_and_case_insensitive() {
        let matcher = Matcher::regex(r"\d{4}-backup").unwrap();
        assert!(matcher.is_match("db-2024-BACKUP.tar"));
        assert!(!matcher.is_match("db-backup.tar"));
        assert!(matches!(
            Matcher::regex("(unclosed"),
            Err(RuleError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_rule_subjects() {
        let by_name = PatternRule::new("*.log", RuleFlags::default()).unwrap();
        assert!(by_name.is_match("app.log", "/var/app.log"));
        assert!(!by_name.is_match("app.txt", "/var/app.log/app.txt"));

        let by_path =
            PatternRule::new("*/cache/*", RuleFlags::from_tokens("FILE SIMPLE PATH").unwrap())
                .unwrap();
        assert!(by_path.is_match("x.bin", "/home/u/Cache/x.bin"));
        assert!(!by_path.is_match("cache", "/home/u/x.bin"));
    }
}
