//! Line grammar for locale files.
//!
//! A locale file is a sequence of lines, each one of: blank, a comment
//! (`#` or `;`), a section header `[name]`, or an entry `key=value`.
//!
//! Two flavors are exposed. [`classify_for_index`] is permissive and
//! best-effort so that symbols keep working on partially invalid documents.
//! [`classify_for_validation`] is strict and reports what is malformed.
//! Both take a single line with its terminator already stripped.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref INDEX_SECTION: Regex = Regex::new(r"^\[([^\]]+)\]$").unwrap();
    static ref INDEX_ENTRY: Regex = Regex::new(r"^([^=]+)=(.+)$").unwrap();
    static ref COMMENT: Regex = Regex::new(r"^[ \r\t]*[#;]").unwrap();
    static ref HEADER_START: Regex = Regex::new(r"^[ \r\t]*\[").unwrap();
    static ref HEADER: Regex = Regex::new(r"^[ \r\t]*\[([^\[]+)\][ \r\t]*$").unwrap();
    static ref KEY_VALUE: Regex = Regex::new(r"^[ \r\t]*([^=]*)=(.*)$").unwrap();
}

/// A line as the indexer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexedLine<'a> {
    /// `[name]` spanning the whole line.
    Section { name: &'a str },
    /// `key=value` with a non-empty key and value.
    Entry { key: &'a str, value: &'a str },
    /// Starts with `#` or `;`.
    Comment,
    /// Blank or not understood; contributes nothing.
    Other,
}

/// Classify a line for indexing.
pub fn classify_for_index(line: &str) -> IndexedLine<'_> {
    if let Some(caps) = INDEX_SECTION.captures(line) {
        return IndexedLine::Section {
            name: caps.get(1).map_or("", |m| m.as_str()),
        };
    }
    if line.starts_with('#') || line.starts_with(';') {
        return IndexedLine::Comment;
    }
    match INDEX_ENTRY.captures(line) {
        Some(caps) => IndexedLine::Entry {
            key: caps.get(1).map_or("", |m| m.as_str()),
            value: caps.get(2).map_or("", |m| m.as_str()),
        },
        None => IndexedLine::Other,
    }
}

/// A line as the validator sees it.
///
/// Offsets are byte offsets into the classified line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckedLine<'a> {
    Blank,
    Comment,
    Section { name: &'a str, offset: usize },
    /// Starts with `[` but is not a well-formed header.
    InvalidSection,
    Entry {
        key: &'a str,
        offset: usize,
        value: &'a str,
    },
    /// Non-blank line without `=`.
    InvalidEntry,
}

/// Classify a line for validation. Leading whitespace is tolerated before
/// comments, headers and keys; trailing whitespace after a header.
pub fn classify_for_validation(line: &str) -> CheckedLine<'_> {
    if COMMENT.is_match(line) {
        return CheckedLine::Comment;
    }
    if HEADER_START.is_match(line) {
        return match HEADER.captures(line).and_then(|caps| caps.get(1)) {
            Some(name) => CheckedLine::Section {
                name: name.as_str(),
                offset: name.start(),
            },
            None => CheckedLine::InvalidSection,
        };
    }
    if line.trim().is_empty() {
        return CheckedLine::Blank;
    }
    match KEY_VALUE.captures(line) {
        Some(caps) => {
            let key = caps.get(1);
            CheckedLine::Entry {
                key: key.map_or("", |m| m.as_str()),
                offset: key.map_or(0, |m| m.start()),
                value: caps.get(2).map_or("", |m| m.as_str()),
            }
        }
        None => CheckedLine::InvalidEntry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_recognizes_sections_and_entries() {
        assert_eq!(
            classify_for_index("[greeting]"),
            IndexedLine::Section { name: "greeting" }
        );
        assert_eq!(
            classify_for_index("hello=Hello=World"),
            IndexedLine::Entry {
                key: "hello",
                value: "Hello=World"
            }
        );
        assert_eq!(classify_for_index("# note"), IndexedLine::Comment);
        assert_eq!(classify_for_index("; note"), IndexedLine::Comment);
    }

    #[test]
    fn index_is_permissive_about_malformed_lines() {
        assert_eq!(classify_for_index(""), IndexedLine::Other);
        assert_eq!(classify_for_index("   "), IndexedLine::Other);
        assert_eq!(classify_for_index("no equals"), IndexedLine::Other);
        // empty value or empty key is not indexed
        assert_eq!(classify_for_index("key="), IndexedLine::Other);
        assert_eq!(classify_for_index("=value"), IndexedLine::Other);
        // nested brackets are not a section
        assert_eq!(classify_for_index("[a]b]"), IndexedLine::Other);
        // indentation is not stripped for indexing
        assert_eq!(classify_for_index("  [a]"), IndexedLine::Other);
    }

    #[test]
    fn validation_tolerates_surrounding_whitespace() {
        assert_eq!(
            classify_for_validation("  [items] \t"),
            CheckedLine::Section {
                name: "items",
                offset: 3
            }
        );
        assert_eq!(
            classify_for_validation("\tkey=value"),
            CheckedLine::Entry {
                key: "key",
                offset: 1,
                value: "value"
            }
        );
        assert_eq!(classify_for_validation("   ; comment"), CheckedLine::Comment);
        assert_eq!(classify_for_validation(" \t "), CheckedLine::Blank);
    }

    #[test]
    fn validation_flags_malformed_lines() {
        assert_eq!(classify_for_validation("[open"), CheckedLine::InvalidSection);
        assert_eq!(classify_for_validation("[]"), CheckedLine::InvalidSection);
        assert_eq!(classify_for_validation("[a[b]"), CheckedLine::InvalidSection);
        assert_eq!(classify_for_validation("[a] trailing"), CheckedLine::InvalidSection);
        assert_eq!(classify_for_validation("just text"), CheckedLine::InvalidEntry);
    }

    #[test]
    fn validation_accepts_empty_key_and_value() {
        assert_eq!(
            classify_for_validation("=value"),
            CheckedLine::Entry {
                key: "",
                offset: 0,
                value: "value"
            }
        );
        assert_eq!(
            classify_for_validation("key="),
            CheckedLine::Entry {
                key: "key",
                offset: 0,
                value: ""
            }
        );
    }
}
