//! Completion of locale names from the workspace index.
//!
//! Before any name is typed, offers one item per section namespace (ending
//! in `.`) or root key. Once a prefix is typed, offers every qualified name
//! starting with it.

use lsp_types::{CompletionItem, CompletionItemKind, Position};

use crate::navigation::{prefix_at_position, WorkspaceIndex};

/// Compute completions for the given position in the document.
pub fn compute_completions(
    index: &WorkspaceIndex,
    position: Position,
    content: &str,
) -> Vec<CompletionItem> {
    let prefix = prefix_at_position(content, position);
    index
        .completions(Some(&prefix))
        .into_iter()
        .map(|name| {
            let (kind, detail) = if name.ends_with('.') {
                (CompletionItemKind::MODULE, "section")
            } else if name.contains('.') {
                (CompletionItemKind::FIELD, "locale key")
            } else {
                (CompletionItemKind::VALUE, "root key or section")
            };
            CompletionItem {
                label: name,
                kind: Some(kind),
                detail: Some(detail.to_string()),
                ..Default::default()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextDocument;

    #[test]
    fn namespaces_then_qualified_names() {
        let mut index = WorkspaceIndex::new();
        index.load(&TextDocument::new(
            "file:///w/a.cfg".parse().unwrap(),
            "factorio-locale",
            1,
            "title=Mod\n[item-name]\niron-plate=Iron plate\n".to_string(),
        ));

        let items = compute_completions(&index, Position::new(0, 0), "");
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, ["title", "item-name", "item-name."]);
        assert_eq!(items[2].kind, Some(CompletionItemKind::MODULE));

        let content = "x=[item-name.ir";
        let items = compute_completions(&index, Position::new(0, 15), content);
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, ["item-name.iron-plate"]);
        assert_eq!(items[0].kind, Some(CompletionItemKind::FIELD));
    }
}
