//! locale-core: format core for INI-like locale files.
//!
//! Provides the transport-independent building blocks the editor services
//! are built on:
//!
//! - [`grammar`] -- line classification, in a permissive flavor used for
//!   indexing and a strict flavor used for validation
//! - [`color`] -- parsing and serializing `[color=...]` values
//! - [`text`] -- UTF-16 column arithmetic for editor positions
//! - [`config`] -- user configuration loaded from `locale.toml`
//! - [`error`] -- the crate error type

/// Source tag attached to every diagnostic this toolchain reports.
pub const DIAGNOSTIC_SOURCE: &str = "factorio-locale";
/// Language identifier editors use for locale documents.
pub const LANGUAGE_ID: &str = "factorio-locale";

pub mod color;
pub mod config;
pub mod error;
pub mod grammar;
pub mod text;

// ── Convenience re-exports ───────────────────────────────────────────

pub use color::{parse_color, Color, ColorParseError};
pub use config::Config;
pub use error::LocaleError;
pub use grammar::{classify_for_index, classify_for_validation, CheckedLine, IndexedLine};
