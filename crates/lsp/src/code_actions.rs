//! Quick fixes built from validator diagnostics.

use std::collections::HashMap;

use lsp_types::{CodeAction, CodeActionKind, Diagnostic, Position, Range, TextEdit, WorkspaceEdit};

use crate::diagnostics::{FixData, SectionMerge};
use crate::document::TextDocument;

pub const MERGE_SECTIONS_TITLE: &str = "Merge Sections";

/// Code actions for the fixable diagnostics in `diagnostics`.
///
/// Only documents of `language_id` get actions; diagnostics without a code or
/// with a code this server does not know are skipped.
pub fn code_actions(
    document: &TextDocument,
    diagnostics: &[Diagnostic],
    language_id: &str,
) -> Vec<CodeAction> {
    if document.language_id() != language_id {
        return Vec::new();
    }
    diagnostics
        .iter()
        .filter(|diag| diag.code.is_some())
        .filter_map(|diag| {
            let fix = FixData::from_diagnostic(diag)?;
            let kind = format!("{}.{}", CodeActionKind::QUICKFIX.as_str(), fix.code());
            let kind = CodeActionKind::from(kind);
            Some(match fix {
                FixData::SectionMerge(merge) => merge_sections(document, diag, &merge, kind),
            })
        })
        .collect()
}

/// Move the body of a repeated section under its first occurrence and delete
/// the repeat.
fn merge_sections(
    document: &TextDocument,
    diag: &Diagnostic,
    merge: &SectionMerge,
    kind: CodeActionKind,
) -> CodeAction {
    let header_end = merge.duplicate.selection_range.end;
    let body = Range::new(
        Position::new(header_end.line, header_end.character.saturating_add(1)),
        merge.duplicate.range.end,
    );
    let insert_at = merge.first.range.end;

    let edits = vec![
        TextEdit::new(merge.duplicate.range, String::new()),
        TextEdit::new(
            Range::new(insert_at, insert_at),
            document.get_text(body).to_string(),
        ),
    ];

    CodeAction {
        title: MERGE_SECTIONS_TITLE.to_string(),
        kind: Some(kind),
        diagnostics: Some(vec![diag.clone()]),
        edit: Some(WorkspaceEdit {
            changes: Some(HashMap::from([(document.uri().clone(), edits)])),
            ..Default::default()
        }),
        ..Default::default()
    }
}
