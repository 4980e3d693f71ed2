//! Single-pass document indexer.
//!
//! Builds the section/entry symbol tree for one document and the flat list
//! of qualified definitions derived from it. Indexing is permissive: lines
//! the grammar does not understand are skipped, never reported.

use locale_core::grammar::{classify_for_index, IndexedLine};
use locale_core::text::utf16_len;
use lsp_types::{DocumentSymbol, LocationLink, Position, Range, SymbolKind};

use crate::document::TextDocument;

/// Symbol kind used for section headers.
pub const SECTION_KIND: SymbolKind = SymbolKind::NAMESPACE;
/// Symbol kind used for key/value entries.
pub const ENTRY_KIND: SymbolKind = SymbolKind::STRING;

/// A globally addressable name for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    /// `section.key` for entries inside a section, otherwise the bare name.
    pub name: String,
    pub link: LocationLink,
}

/// Indexed view of one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentIndex {
    /// Top-level symbols in source order: sections and root entries.
    pub symbols: Vec<DocumentSymbol>,
    /// One definition per symbol, in source order.
    pub definitions: Vec<Definition>,
}

pub fn is_section(symbol: &DocumentSymbol) -> bool {
    symbol.kind == SECTION_KIND
}

pub fn is_entry(symbol: &DocumentSymbol) -> bool {
    symbol.kind == ENTRY_KIND
}

/// Index `document` from its full current text.
pub fn index_document(document: &TextDocument) -> DocumentIndex {
    let mut symbols: Vec<DocumentSymbol> = Vec::new();
    let mut current_section: Option<usize> = None;

    for line in 0..document.line_count() {
        let text = document.line(line);
        let range = document.line_range(line);

        match classify_for_index(text) {
            IndexedLine::Section { name } => {
                let selection = Range::new(
                    Position::new(line, 1),
                    Position::new(line, range.end.character.saturating_sub(1)),
                );
                symbols.push(make_symbol(
                    name,
                    None,
                    SECTION_KIND,
                    range,
                    selection,
                    Some(Vec::new()),
                ));
                current_section = Some(symbols.len() - 1);
            }
            IndexedLine::Entry { key, value } => {
                let selection =
                    Range::new(Position::new(line, 0), Position::new(line, utf16_len(key)));
                let entry = make_symbol(key, Some(value), ENTRY_KIND, range, selection, None);
                match current_section.and_then(|i| symbols.get_mut(i)) {
                    Some(section) => {
                        section.range.end = range.end;
                        section.children.get_or_insert_with(Vec::new).push(entry);
                    }
                    None => symbols.push(entry),
                }
            }
            IndexedLine::Comment | IndexedLine::Other => {}
        }
    }

    let definitions = collect_definitions(document, &symbols);
    DocumentIndex {
        symbols,
        definitions,
    }
}

fn collect_definitions(document: &TextDocument, symbols: &[DocumentSymbol]) -> Vec<Definition> {
    let mut definitions = Vec::new();
    for symbol in symbols {
        definitions.push(make_definition(document, symbol.name.clone(), symbol));
        for child in symbol.children.iter().flatten() {
            let name = format!("{}.{}", symbol.name, child.name);
            definitions.push(make_definition(document, name, child));
        }
    }
    definitions
}

fn make_definition(document: &TextDocument, name: String, symbol: &DocumentSymbol) -> Definition {
    Definition {
        name,
        link: LocationLink {
            origin_selection_range: None,
            target_uri: document.uri().clone(),
            target_range: symbol.range,
            target_selection_range: symbol.selection_range,
        },
    }
}

#[allow(deprecated)]
fn make_symbol(
    name: &str,
    detail: Option<&str>,
    kind: SymbolKind,
    range: Range,
    selection_range: Range,
    children: Option<Vec<DocumentSymbol>>,
) -> DocumentSymbol {
    DocumentSymbol {
        name: name.to_string(),
        detail: Some(detail.unwrap_or_default().to_string()),
        kind,
        tags: None,
        deprecated: None,
        range,
        selection_range,
        children,
    }
}
