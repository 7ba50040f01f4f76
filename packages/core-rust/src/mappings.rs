//! Parser for administrative mapping text.
//!
//! Mapping text is a newline-delimited block of `key=value` pairs, the form a
//! control-bus command carries, e.g. `"foo=qux \n baz=bar"`.

use std::collections::HashMap;

use tracing::debug;

/// Parses a block of `key=value` lines into a fresh mapping table.
///
/// - Blank lines and lines starting with `#` or `!` are skipped.
/// - The first `=` separates key and value; `:` is accepted when no `=` is
///   present. Both sides are trimmed.
/// - Lines without a separator, or with an empty key, are ignored.
/// - A later duplicate key overrides an earlier one.
#[must_use]
pub fn parse_mappings(text: &str) -> HashMap<String, String> {
    let mut mappings = HashMap::new();
    for (line_no, raw) in text.split('\n').enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        match split_entry(line) {
            Some((key, value)) => {
                mappings.insert(key.to_string(), value.to_string());
            }
            None => debug!(line = line_no + 1, content = line, "ignoring malformed mapping line"),
        }
    }
    mappings
}

fn split_entry(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=').or_else(|| line.split_once(':'))?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parses_control_bus_text() {
        let mappings = parse_mappings("foo=qux \n baz=bar");
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings["foo"], "qux");
        assert_eq!(mappings["baz"], "bar");
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "# routing table\n\n! legacy comment\nus=orders-us\r\n";
        let mappings = parse_mappings(text);
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings["us"], "orders-us");
    }

    #[test]
    fn ignores_malformed_lines() {
        let mappings = parse_mappings("no separator here\n=orphan\nok=fine");
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings["ok"], "fine");
    }

    #[test]
    fn colon_separator_and_first_equals_wins() {
        let mappings = parse_mappings("a: b\nurl=http://x?y=z");
        assert_eq!(mappings["a"], "b");
        assert_eq!(mappings["url"], "http://x?y=z");
    }

    #[test]
    fn empty_value_is_kept() {
        let mappings = parse_mappings("blank=");
        assert_eq!(mappings["blank"], "");
    }

    #[test]
    fn later_duplicate_overrides() {
        let mappings = parse_mappings("k=1\nk=2");
        assert_eq!(mappings["k"], "2");
    }

    #[test]
    fn empty_text_yields_empty_table() {
        assert!(parse_mappings("").is_empty());
    }

    proptest! {
        /// Whatever the input, every parsed entry has a trimmed, non-empty key
        /// and a trimmed value.
        #[test]
        fn parsed_entries_are_trimmed(text in "[ a-z=:#!\\r\\n]{0,64}") {
            for (key, value) in parse_mappings(&text) {
                prop_assert!(!key.is_empty());
                prop_assert_eq!(key.trim(), key.as_str());
                prop_assert_eq!(value.trim(), value.as_str());
            }
        }
    }
}
