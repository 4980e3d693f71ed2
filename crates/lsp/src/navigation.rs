//! Workspace-wide index: per-document caches plus definition and
//! completion queries across every cached document.

use std::collections::{BTreeMap, HashSet};

use locale_core::text::byte_offset;
use lsp_types::{DocumentSymbol, LocationLink, Position};
use tracing::debug;

use crate::document::TextDocument;
use crate::index::{index_document, DocumentIndex};

/// Cached document indexes, keyed by document URI.
///
/// Entries are only ever replaced whole, so readers always see a complete
/// snapshot. Iteration is in URI order.
#[derive(Debug, Default)]
pub struct WorkspaceIndex {
    documents: BTreeMap<String, DocumentIndex>,
}

impl WorkspaceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-index `document` and replace its cache entry.
    pub fn load(&mut self, document: &TextDocument) -> &DocumentIndex {
        let index = index_document(document);
        debug!(
            uri = document.uri().as_str(),
            symbols = index.symbols.len(),
            definitions = index.definitions.len(),
            "indexed document"
        );
        self.upsert(document.uri().as_str(), index)
    }

    /// Insert or replace the index for `uri`.
    pub fn upsert(&mut self, uri: &str, index: DocumentIndex) -> &DocumentIndex {
        let slot = self.documents.entry(uri.to_owned()).or_default();
        *slot = index;
        slot
    }

    pub fn remove(&mut self, uri: &str) -> Option<DocumentIndex> {
        self.documents.remove(uri)
    }

    /// Drop every document whose URI starts with `prefix`, e.g. when a
    /// workspace folder is closed. Returns how many were removed.
    pub fn remove_by_prefix(&mut self, prefix: &str) -> usize {
        let before = self.documents.len();
        self.documents.retain(|uri, _| !uri.starts_with(prefix));
        before - self.documents.len()
    }

    pub fn get(&self, uri: &str) -> Option<&DocumentIndex> {
        self.documents.get(uri)
    }

    /// Cached index for `document`, indexing it first on a miss.
    pub fn get_or_load(&mut self, document: &TextDocument) -> &DocumentIndex {
        let uri = document.uri().as_str();
        if !self.documents.contains_key(uri) {
            return self.load(document);
        }
        &self.documents[uri]
    }

    /// Top-level symbols of `document`, indexing it first on a miss.
    pub fn symbols(&mut self, document: &TextDocument) -> Vec<DocumentSymbol> {
        self.get_or_load(document).symbols.clone()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Every location defining `name`, in document order then source order.
    /// Repeated definitions are all returned.
    pub fn find_definitions(&self, name: &str) -> Vec<LocationLink> {
        self.documents
            .values()
            .flat_map(|doc| doc.definitions.iter())
            .filter(|def| def.name == name)
            .map(|def| def.link.clone())
            .collect()
    }

    /// Definition names for completion.
    ///
    /// With a non-empty prefix: every qualified name starting with it. Without
    /// one: each distinct namespace, i.e. bare names as-is and qualified names
    /// cut after their first `.`. Results are distinct, in first-seen order.
    pub fn completions(&self, prefix: Option<&str>) -> Vec<String> {
        let names = self
            .documents
            .values()
            .flat_map(|doc| doc.definitions.iter())
            .map(|def| def.name.as_str());

        let candidates: Vec<&str> = match prefix.filter(|p| !p.is_empty()) {
            Some(prefix) => names.filter(|name| name.starts_with(prefix)).collect(),
            None => names
                .map(|name| match name.find('.') {
                    Some(dot) => &name[..=dot],
                    None => name,
                })
                .collect(),
        };

        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|name| seen.insert(*name))
            .map(str::to_owned)
            .collect()
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// The qualified name under the cursor, e.g. `item-name.iron-plate`.
pub fn word_at_position(content: &str, position: Position) -> Option<String> {
    let line = content.lines().nth(position.line as usize)?;
    let cursor = byte_offset(line, position.character);

    let start = line[..cursor]
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_name_char(*c))
        .last()
        .map_or(cursor, |(i, _)| i);
    let end = line[cursor..]
        .char_indices()
        .find(|(_, c)| !is_name_char(*c))
        .map_or(line.len(), |(i, _)| cursor + i);

    let word = &line[start..end];
    if word.is_empty() {
        None
    } else {
        Some(word.to_string())
    }
}

/// The part of a qualified name left of the cursor; empty when the cursor
/// does not follow a name.
pub fn prefix_at_position(content: &str, position: Position) -> String {
    let Some(line) = content.lines().nth(position.line as usize) else {
        return String::new();
    };
    let cursor = byte_offset(line, position.character);
    let start = line[..cursor]
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_name_char(*c))
        .last()
        .map_or(cursor, |(i, _)| i);
    line[start..cursor].to_string()
}
