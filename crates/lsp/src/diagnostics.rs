//! Structural validation of locale documents.
//!
//! Runs a strict line-by-line pass with its own scope table, and consults the
//! document's indexed symbols only to point duplicates at their first
//! definition. Every problem becomes an error diagnostic; validation always
//! reaches the end of the document.

use std::collections::{HashMap, HashSet};

use locale_core::grammar::{classify_for_validation, CheckedLine};
use locale_core::text::{utf16_column, utf16_len};
use locale_core::DIAGNOSTIC_SOURCE;
use lsp_types::{
    Diagnostic, DiagnosticRelatedInformation, DiagnosticSeverity, DocumentSymbol, Location,
    NumberOrString, Position, Range,
};
use serde::{Deserialize, Serialize};

use crate::document::TextDocument;
use crate::index::{is_entry, is_section, DocumentIndex};

pub const MSG_DUPLICATE_SECTION: &str = "Duplicate Section";
pub const MSG_SECTION_KEY_CONFLICT: &str = "Section Name conflicts with Key in Root";
pub const MSG_INVALID_SECTION: &str = "Invalid Section Header";
pub const MSG_DUPLICATE_KEY: &str = "Duplicate Key";
pub const MSG_INVALID_KEY: &str = "Invalid Key";
const MSG_FIRST_DEFINED: &str = "First defined here";

/// Context attached to a diagnostic so a fix can be built from it later.
///
/// The variant is identified on the wire by the diagnostic's `code`; the
/// payload travels in its `data` field.
#[derive(Debug, Clone, PartialEq)]
pub enum FixData {
    SectionMerge(SectionMerge),
}

/// A section header repeated later in the same document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionMerge {
    pub first: DocumentSymbol,
    pub duplicate: DocumentSymbol,
}

impl FixData {
    pub const SECTION_MERGE: &'static str = "section.merge";

    pub fn code(&self) -> &'static str {
        match self {
            FixData::SectionMerge(_) => Self::SECTION_MERGE,
        }
    }

    /// Recover fix data from a diagnostic produced by [`validate`].
    ///
    /// Returns `None` for unknown codes or payloads that do not match the code.
    pub fn from_diagnostic(diagnostic: &Diagnostic) -> Option<Self> {
        let Some(NumberOrString::String(code)) = &diagnostic.code else {
            return None;
        };
        let data = diagnostic.data.clone()?;
        match code.as_str() {
            Self::SECTION_MERGE => serde_json::from_value(data).ok().map(FixData::SectionMerge),
            _ => None,
        }
    }

    fn to_value(&self) -> Option<serde_json::Value> {
        match self {
            FixData::SectionMerge(merge) => serde_json::to_value(merge).ok(),
        }
    }
}

/// Validate `document` against its indexed snapshot.
///
/// `related_information` controls whether duplicates carry a pointer to their
/// first definition, which clients must opt into.
pub fn validate(
    document: &TextDocument,
    index: &DocumentIndex,
    related_information: bool,
) -> Vec<Diagnostic> {
    let mut validator = Validator {
        document,
        index,
        related_information,
        scopes: HashMap::new(),
        current: None,
        diagnostics: Vec::new(),
    };
    validator.scopes.insert(None, HashSet::new());
    for line in 0..document.line_count() {
        validator.check_line(line);
    }
    validator.diagnostics
}

struct Validator<'a> {
    document: &'a TextDocument,
    index: &'a DocumentIndex,
    related_information: bool,
    /// Keys seen so far, per section name; `None` is the root scope.
    scopes: HashMap<Option<&'a str>, HashSet<&'a str>>,
    current: Option<&'a str>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Validator<'a> {
    fn check_line(&mut self, line: u32) {
        let text = self.document.line(line);
        match classify_for_validation(text) {
            CheckedLine::Blank | CheckedLine::Comment => {}
            CheckedLine::Section { name, offset } => self.check_section(line, text, name, offset),
            CheckedLine::InvalidSection => {
                let range = self.document.line_range(line);
                self.push(error(range, MSG_INVALID_SECTION));
            }
            CheckedLine::Entry { key, offset, .. } => self.check_entry(line, text, key, offset),
            CheckedLine::InvalidEntry => {
                let range = self.document.line_range(line);
                self.push(error(range, MSG_INVALID_KEY));
            }
        }
    }

    fn check_section(&mut self, line: u32, text: &str, name: &'a str, offset: usize) {
        self.current = Some(name);
        let range = name_range(line, text, offset, name);

        if self.scopes.contains_key(&Some(name)) {
            let index = self.index;
            // Only symbols above this header can be its first definition.
            let earlier: Vec<&DocumentSymbol> = index
                .symbols
                .iter()
                .filter(|s| s.name == name && s.range.start.line < line)
                .collect();
            let first = earliest(earlier.iter().copied());
            let first_section = earliest(earlier.iter().copied().filter(|s| is_section(s)));
            let duplicate = index
                .symbols
                .iter()
                .find(|s| is_section(s) && s.name == name && s.range.start.line == line);

            let mut diagnostic = error(range, MSG_DUPLICATE_SECTION);
            diagnostic.code = Some(NumberOrString::String(FixData::SECTION_MERGE.to_string()));
            if let (Some(first), Some(duplicate)) = (first_section, duplicate) {
                let fix = FixData::SectionMerge(SectionMerge {
                    first: first.clone(),
                    duplicate: duplicate.clone(),
                });
                diagnostic.data = fix.to_value();
            }
            self.relate(&mut diagnostic, first);
            self.push(diagnostic);
        } else if self.root_keys().contains(name) {
            let first = earliest(self.index.symbols.iter().filter(|s| s.name == name));
            let mut diagnostic = error(range, MSG_SECTION_KEY_CONFLICT);
            self.relate(&mut diagnostic, first);
            self.push(diagnostic);
            self.scopes.insert(Some(name), HashSet::new());
        } else {
            self.scopes.insert(Some(name), HashSet::new());
        }
    }

    fn check_entry(&mut self, line: u32, text: &str, key: &'a str, offset: usize) {
        let current = self.current;
        let seen = self.scopes.entry(current).or_default();
        if seen.insert(key) {
            return;
        }

        let first = match current {
            Some(section) => earliest(
                self.index
                    .symbols
                    .iter()
                    .filter(|s| is_section(s) && s.name == section)
                    .flat_map(|s| s.children.iter().flatten())
                    .filter(|c| is_entry(c) && c.name == key),
            ),
            None => earliest(
                self.index
                    .symbols
                    .iter()
                    .filter(|s| is_entry(s) && s.name == key),
            ),
        };
        let mut diagnostic = error(name_range(line, text, offset, key), MSG_DUPLICATE_KEY);
        self.relate(&mut diagnostic, first);
        self.push(diagnostic);
    }

    fn root_keys(&self) -> &HashSet<&'a str> {
        // the root scope is inserted before the first line is checked
        &self.scopes[&None]
    }

    fn relate(&self, diagnostic: &mut Diagnostic, first: Option<&DocumentSymbol>) {
        if !self.related_information {
            return;
        }
        if let Some(first) = first {
            diagnostic.related_information = Some(vec![DiagnosticRelatedInformation {
                location: Location::new(self.document.uri().clone(), first.range),
                message: MSG_FIRST_DEFINED.to_string(),
            }]);
        }
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// The symbol starting on the smallest line; ties keep the earlier one.
fn earliest<'s>(symbols: impl Iterator<Item = &'s DocumentSymbol>) -> Option<&'s DocumentSymbol> {
    symbols.min_by_key(|s| s.range.start.line)
}

fn name_range(line: u32, text: &str, offset: usize, name: &str) -> Range {
    let start = utf16_column(text, offset);
    Range::new(
        Position::new(line, start),
        Position::new(line, start + utf16_len(name)),
    )
}

fn error(range: Range, message: &str) -> Diagnostic {
    Diagnostic {
        range,
        severity: Some(DiagnosticSeverity::ERROR),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: message.to_string(),
        ..Default::default()
    }
}
