//! Color swatches for `[color=...]` rich-text tags.

use lazy_static::lazy_static;
use locale_core::color::parse_color;
use locale_core::text::utf16_column;
use lsp_types::{ColorInformation, ColorPresentation, Position, Range, TextEdit};
use regex::Regex;

use crate::document::TextDocument;

lazy_static! {
    static ref COLOR_TAG: Regex = Regex::new(r"\[color=([^\]]+)\]").unwrap();
}

pub fn to_lsp_color(color: locale_core::Color) -> lsp_types::Color {
    lsp_types::Color {
        red: color.red,
        green: color.green,
        blue: color.blue,
        alpha: color.alpha,
    }
}

pub fn from_lsp_color(color: lsp_types::Color) -> locale_core::Color {
    locale_core::Color::new(color.red, color.green, color.blue, color.alpha)
}

/// Every parseable color value in `document`. The range covers only the
/// value, not the surrounding `[color=` and `]`.
pub fn document_colors(document: &TextDocument) -> Vec<ColorInformation> {
    let mut colors = Vec::new();
    for line in 0..document.line_count() {
        let text = document.line(line);
        for caps in COLOR_TAG.captures_iter(text) {
            let Some(value) = caps.get(1) else { continue };
            let Some(color) = parse_color(value.as_str()) else {
                continue;
            };
            colors.push(ColorInformation {
                range: Range::new(
                    Position::new(line, utf16_column(text, value.start())),
                    Position::new(line, utf16_column(text, value.end())),
                ),
                color: to_lsp_color(color),
            });
        }
    }
    colors
}

/// Replacement candidates for a color picked in the editor.
pub fn color_presentations(color: lsp_types::Color, range: Range) -> Vec<ColorPresentation> {
    from_lsp_color(color)
        .notations()
        .into_iter()
        .map(|notation| ColorPresentation {
            label: notation.clone(),
            text_edit: Some(TextEdit::new(range, notation)),
            additional_text_edits: None,
        })
        .collect()
}
