//! Text buffers for open documents and the state tracking them.

use std::collections::HashMap;
use std::path::Path;

use locale_core::text::{byte_offset, utf16_len};
use lsp_types::{Position, Range, Uri};

/// Full text of one document plus a line table for position queries.
///
/// Lines are split on `\n`; a `\r` before it is part of the terminator.
/// Positions use UTF-16 columns.
#[derive(Debug, Clone)]
pub struct TextDocument {
    uri: Uri,
    language_id: String,
    version: i32,
    text: String,
    line_starts: Vec<usize>,
}

impl TextDocument {
    pub fn new(uri: Uri, language_id: impl Into<String>, version: i32, text: String) -> Self {
        let line_starts = compute_line_starts(&text);
        Self {
            uri,
            language_id: language_id.into(),
            version,
            text,
            line_starts,
        }
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the whole content.
    pub fn set_text(&mut self, version: i32, text: String) {
        self.line_starts = compute_line_starts(&text);
        self.version = version;
        self.text = text;
    }

    /// Number of lines. An empty document has one empty line, and a trailing
    /// newline opens a final empty line.
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Text of line `line` without its terminator; empty past the end.
    pub fn line(&self, line: u32) -> &str {
        let Some(&start) = self.line_starts.get(line as usize) else {
            return "";
        };
        let end = self
            .line_starts
            .get(line as usize + 1)
            .copied()
            .unwrap_or(self.text.len());
        let raw = &self.text[start..end];
        let raw = raw.strip_suffix('\n').unwrap_or(raw);
        raw.strip_suffix('\r').unwrap_or(raw)
    }

    /// Range covering the content of `line`, terminator excluded.
    pub fn line_range(&self, line: u32) -> Range {
        Range::new(
            Position::new(line, 0),
            Position::new(line, utf16_len(self.line(line))),
        )
    }

    /// Byte offset of `position`. Columns past the line content clamp to its
    /// end; lines past the document clamp to the end of the text.
    pub fn offset_at(&self, position: Position) -> usize {
        match self.line_starts.get(position.line as usize) {
            Some(&start) => start + byte_offset(self.line(position.line), position.character),
            None => self.text.len(),
        }
    }

    /// Text between two positions.
    pub fn get_text(&self, range: Range) -> &str {
        let start = self.offset_at(range.start);
        let end = self.offset_at(range.end);
        if start >= end {
            return "";
        }
        &self.text[start..end]
    }
}

fn compute_line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    starts.extend(
        text.bytes()
            .enumerate()
            .filter(|(_, b)| *b == b'\n')
            .map(|(i, _)| i + 1),
    );
    starts
}

/// Tracks which documents are currently open in the editor.
#[derive(Default)]
pub struct DocumentState {
    documents: HashMap<String, TextDocument>,
}

impl DocumentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly opened document, replacing any previous buffer.
    pub fn open(&mut self, document: TextDocument) -> &TextDocument {
        let key = document.uri().as_str().to_owned();
        self.documents.insert(key.clone(), document);
        &self.documents[&key]
    }

    /// Update content for an already-open document.
    pub fn change(&mut self, uri: &str, version: i32, text: String) -> Option<&TextDocument> {
        let doc = self.documents.get_mut(uri)?;
        doc.set_text(version, text);
        Some(doc)
    }

    /// Stop tracking a closed document.
    pub fn close(&mut self, uri: &str) -> Option<TextDocument> {
        self.documents.remove(uri)
    }

    pub fn get(&self, uri: &str) -> Option<&TextDocument> {
        self.documents.get(uri)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Convert a file path to a `file://` URI.
pub fn path_to_uri(path: &Path) -> Option<Uri> {
    let abs = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let path_str = abs.to_string_lossy().replace('\\', "/");
    let path_str = path_str.replace('%', "%25").replace(' ', "%20");
    let uri = if path_str.starts_with('/') {
        format!("file://{}", path_str)
    } else {
        format!("file:///{}", path_str)
    };
    uri.parse().ok()
}
