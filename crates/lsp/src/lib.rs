//! Locale Language Server Protocol implementation for IDE integration.
//!
//! Provides validation diagnostics, document symbols, cross-document
//! go-to-definition and completion of locale names, color swatches for
//! `[color=...]` tags, and a quick fix that merges repeated sections.
//! Connects to editors via the `locale lsp` CLI subcommand over stdio.

pub mod code_actions;
pub mod colors;
pub mod completion;
pub mod diagnostics;
pub mod document;
pub mod index;
pub mod navigation;
pub mod server;

pub use document::{DocumentState, TextDocument};
pub use index::{index_document, Definition, DocumentIndex};
pub use navigation::WorkspaceIndex;
pub use server::Session;

/// Run the LSP server over stdio. This is the public entry point
/// called by `locale lsp`.
pub fn run(config: locale_core::Config) -> Result<(), Box<dyn std::error::Error>> {
    server::run(config)
}
