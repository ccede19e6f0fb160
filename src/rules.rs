//! Blocklist rule engine (C5).
//!
//! The rules file groups `BAN_DOMAIN`/`BAN_WORD` entries under `[category]`
//! headers:
//!
//! ```text
//! [ads]
//! BAN_DOMAIN ads.example.com
//! BAN_WORD   casino
//! ```
//!
//! The category-header detector preserves a parsing quirk from the original
//! implementation on purpose: a line is treated as a header if it *starts*
//! with `[` **or** *ends* with `]` — not only when both hold. A stray
//! trailing `]` on an otherwise ordinary line is therefore misparsed as a
//! (nameless) category header. This is a documented, intentionally
//! preserved behavior, not a bug to fix here.

use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct Category {
    pub name: String,
    pub banned_domains: Vec<String>,
    pub banned_words: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub categories: Vec<Category>,
}

impl RuleSet {
    /// Loads a rules file from `path`. Unparseable lines are skipped and
    /// logged, matching the forgiving behavior of the config loader.
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<RuleSet> {
        let contents = fs::read_to_string(path)?;
        Ok(RuleSet::parse(&contents))
    }

    /// Parses rules text directly, for testing and for callers that already
    /// have the file contents in memory.
    pub fn parse(contents: &str) -> RuleSet {
        let mut categories: Vec<Category> = Vec::new();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if is_category_header(line) {
                let name = line.trim_start_matches('[').trim_end_matches(']').to_string();
                categories.push(Category { name, ..Default::default() });
                continue;
            }

            if let Some(value) = line.strip_prefix("BAN_DOMAIN ") {
                if let Some(category) = categories.last_mut() {
                    category.banned_domains.push(value.trim().to_string());
                } else {
                    log::warn!("rules: BAN_DOMAIN entry before any [category] header: {:?}", value);
                }
                continue;
            }

            if let Some(value) = line.strip_prefix("BAN_WORD ") {
                if let Some(category) = categories.last_mut() {
                    category.banned_words.push(value.trim().to_string());
                } else {
                    log::warn!("rules: BAN_WORD entry before any [category] header: {:?}", value);
                }
                continue;
            }

            log::warn!("rules: unrecognized line: {:?}", line);
        }

        RuleSet { categories }
    }

    /// Returns true if `host` exactly matches a banned domain in any
    /// category. `banned_words` are loaded but never consulted here,
    /// matching the original's behavior.
    pub fn is_denied(&self, host: &str) -> bool {
        self.categories
            .iter()
            .any(|category| category.banned_domains.iter().any(|domain| domain == host))
    }
}

fn is_category_header(line: &str) -> bool {
    line.starts_with('[') || line.ends_with(']')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_categories_and_entries() {
        let rules = RuleSet::parse(
            "[ads]\nBAN_DOMAIN ads.example.com\nBAN_WORD casino\n[tracking]\nBAN_DOMAIN track.example.com\n",
        );
        assert_eq!(rules.categories.len(), 2);
        assert_eq!(rules.categories[0].name, "ads");
        assert_eq!(rules.categories[0].banned_domains, vec!["ads.example.com"]);
        assert_eq!(rules.categories[0].banned_words, vec!["casino"]);
        assert_eq!(rules.categories[1].banned_domains, vec!["track.example.com"]);
    }

    #[test]
    fn is_denied_matches_exact_domain_only() {
        let rules = RuleSet::parse("[ads]\nBAN_DOMAIN ads.example.com\n");
        assert!(rules.is_denied("ads.example.com"));
        assert!(!rules.is_denied("sub.ads.example.com"));
        assert!(!rules.is_denied("ads.example.com.evil.com"));
    }

    #[test]
    fn banned_words_are_stored_but_not_enforced() {
        let rules = RuleSet::parse("[ads]\nBAN_WORD casino\n");
        assert!(!rules.is_denied("casino"));
        assert_eq!(rules.categories[0].banned_words, vec!["casino"]);
    }

    #[test]
    fn trailing_bracket_alone_is_misparsed_as_a_header() {
        // Preserves the original disjunction quirk: a line ending in ']'
        // with no leading '[' is still treated as a category header.
        let rules = RuleSet::parse("not a header]\nBAN_DOMAIN example.com\n");
        assert_eq!(rules.categories.len(), 1);
        assert_eq!(rules.categories[0].name, "not a header");
        assert_eq!(rules.categories[0].banned_domains, vec!["example.com"]);
    }

    #[test]
    fn entries_before_any_header_are_dropped() {
        let rules = RuleSet::parse("BAN_DOMAIN example.com\n");
        assert!(rules.categories.is_empty());
        assert!(!rules.is_denied("example.com"));
    }
}
