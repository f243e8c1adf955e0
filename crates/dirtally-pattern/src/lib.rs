//! Name and path pattern rules for dirtally.
//!
//! Rules are declared in a small line-based format (see [`PatternFileLoader`])
//! and resolved per entry with first-match-wins semantics:
//!
//! ```rust
//! use dirtally_core::EntryKind;
//! use dirtally_pattern::{PatternFileLoader, PatternSet};
//!
//! let rules = PatternFileLoader::parse_str("*.tmp\n:: DIRECTORY SIMPLE NAME\n.git\n").unwrap();
//! let set = PatternSet::from_rules(rules);
//!
//! let hit = set.resolve(EntryKind::File, "a.TMP", "/x/a.TMP").unwrap();
//! assert_eq!(hit.text(), "*.tmp");
//! assert!(set.resolve(EntryKind::File, ".git", "/x/.git").is_none());
//! ```

mod error;
mod flags;
mod loader;
mod rule;
mod set;

pub use error::{PatternError, RuleError};
pub use flags::{OptionToken, RuleFlags, Syntax};
pub use loader::{OPTION_MARKER, PatternFileLoader};
pub use rule::{Matcher, PatternRule};
pub use set::PatternSet;
