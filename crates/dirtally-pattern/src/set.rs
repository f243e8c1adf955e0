//! Ordered rule collections with first-match-wins resolution.

use dirtally_core::EntryKind;

use crate::rule::PatternRule;

/// Rules split by the entry kind they apply to.
///
/// Declaration order is preserved within each list. A rule that applies to
/// both files and directories appears in both.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    file_rules: Vec<PatternRule>,
    directory_rules: Vec<PatternRule>,
}

impl PatternSet {
    /// An empty set; nothing ever matches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Partition rules in declaration order.
    pub fn from_rules(rules: impl IntoIterator<Item = PatternRule>) -> Self {
        let mut set = Self::new();
        for rule in rules {
            set.push(rule);
        }
        set
    }

    /// Append a rule after all existing ones.
    pub fn push(&mut self, rule: PatternRule) {
        match (
            rule.applies_to(EntryKind::File),
            rule.applies_to(EntryKind::Directory),
        ) {
            (true, true) => {
                self.file_rules.push(rule.clone());
                self.directory_rules.push(rule);
            }
            (true, false) => self.file_rules.push(rule),
            (false, true) => self.directory_rules.push(rule),
            (false, false) => {}
        }
    }

    /// Find the first rule of `kind` matching the entry's name or path.
    pub fn resolve(&self, kind: EntryKind, name: &str, path: &str) -> Option<&PatternRule> {
        self.rules_for(kind)
            .iter()
            .find(|rule| rule.is_match(name, path))
    }

    pub fn rules_for(&self, kind: EntryKind) -> &[PatternRule] {
        match kind {
            EntryKind::File => &self.file_rules,
            EntryKind::Directory => &self.directory_rules,
        }
    }

    pub fn file_rules(&self) -> &[PatternRule] {
        &self.file_rules
    }

    pub fn directory_rules(&self) -> &[PatternRule] {
        &self.directory_rules
    }

    pub fn is_empty(&self) -> bool {
        self.file_rules.is_empty() && self.directory_rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::RuleFlags;

    fn rule(text: &str, options: &str) -> PatternRule {
        PatternRule::new(text, RuleFlags::from_tokens(options).unwrap()).unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let set = PatternSet::from_rules([
            rule("*.tmp", "FILE SIMPLE NAME"),
            rule("report.tmp", "FILE SIMPLE NAME"),
        ]);
        let matched = set
            .resolve(EntryKind::File, "report.tmp", "/data/report.tmp")
            .unwrap();
        assert_eq!(matched.text(), "*.tmp");
    }

    #[test]
    fn test_rules_partitioned_by_kind() {
        let set = PatternSet::from_rules([
            rule("node_modules", "DIRECTORY SIMPLE NAME"),
            rule("*.log", "FILE SIMPLE NAME"),
            rule("^build$", "FILE DIRECTORY REGEX NAME"),
        ]);
        assert_eq!(set.file_rules().len(), 2);
        assert_eq!(set.directory_rules().len(), 2);
        assert_eq!(set.directory_rules()[0].text(), "node_modules");
        assert_eq!(set.directory_rules()[1].text(), "^build$");

        assert!(set
            .resolve(EntryKind::File, "node_modules", "/p/node_modules")
            .is_none());
        assert!(set
            .resolve(EntryKind::Directory, "node_modules", "/p/node_modules")
            .is_some());
        assert!(set.resolve(EntryKind::Directory, "Build", "/p/Build").is_some());
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let set = PatternSet::new();
        assert!(set.is_empty());
        assert!(set.resolve(EntryKind::File, "a", "/a").is_none());
    }
}
