use dirtally_core::EntryKind;
use dirtally_pattern::{PatternError, PatternFileLoader, RuleError};
use std::fs;
use tempfile::TempDir;

const PATTERNS: &str = "\
# comment lines are ordinary literal patterns
*.tmp
~*

:: DIRECTORY SIMPLE NAME
node_modules
*cache*

:: FILE DIRECTORY REGEX PATH
[/\\\\]\\.git([/\\\\]|$)

:: file simple name path
*.bak
";

#[test]
fn test_load_pattern_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("patterns.txt");
    fs::write(&file, PATTERNS).unwrap();

    let set = PatternFileLoader::load(&file).unwrap();

    let file_texts: Vec<&str> = set.file_rules().iter().map(|r| r.text()).collect();
    assert_eq!(
        file_texts,
        vec![
            "# comment lines are ordinary literal patterns",
            "*.tmp",
            "~*",
            "[/\\\\]\\.git([/\\\\]|$)",
            "*.bak"
        ]
    );

    let dir_texts: Vec<&str> = set.directory_rules().iter().map(|r| r.text()).collect();
    assert_eq!(
        dir_texts,
        vec!["node_modules", "*cache*", "[/\\\\]\\.git([/\\\\]|$)"]
    );
}

#[test]
fn test_resolve_against_loaded_rules() {
    let set = dirtally_pattern::PatternSet::from_rules(
        PatternFileLoader::parse_str(PATTERNS).unwrap(),
    );

    let hit = set
        .resolve(EntryKind::File, "~lock.docx", "/docs/~lock.docx")
        .unwrap();
    assert_eq!(hit.text(), "~*");

    let hit = set
        .resolve(EntryKind::Directory, "WebCache", "/home/u/WebCache")
        .unwrap();
    assert_eq!(hit.text(), "*cache*");
    assert_eq!(hit.flags().to_string(), "DIRECTORY SIMPLE NAME");

    let hit = set
        .resolve(EntryKind::File, "config", "/repo/.git/config")
        .unwrap();
    assert!(hit.flags().is_regex());

    // Matched through the path subject; the name subject does not match.
    let hit = set
        .resolve(EntryKind::File, "notes", "/archive/notes.bak")
        .unwrap();
    assert_eq!(hit.text(), "*.bak");

    assert!(set
        .resolve(EntryKind::File, "main.rs", "/repo/src/main.rs")
        .is_none());
}

#[test]
fn test_unknown_token_names_token_and_line() {
    let err = PatternFileLoader::parse_str("*.tmp\n:: FILE SIMPLE NAME RECURSIVE\n").unwrap_err();
    match err {
        PatternError::Syntax {
            line,
            reason: RuleError::UnknownOption(token),
        } => {
            assert_eq!(line, 2);
            assert_eq!(token, "RECURSIVE");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let temp = TempDir::new().unwrap();
    let err = PatternFileLoader::load(temp.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, PatternError::Io { .. }));
    assert_eq!(err.line(), None);
}
