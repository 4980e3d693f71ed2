//! User configuration, read from `locale.toml`.
//!
//! ```toml
//! language_id = "factorio-locale"
//! related_information = true
//! extensions = ["cfg"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LocaleError;

/// File name looked up in the working directory when no path is given.
pub const CONFIG_FILE_NAME: &str = "locale.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    /// Language id of documents that get locale code actions.
    pub language_id: String,
    /// Attach "first defined here" locations even when the client did not
    /// announce support for them.
    pub related_information: bool,
    /// File extensions picked up when walking directories.
    pub extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            language_id: crate::LANGUAGE_ID.to_string(),
            related_information: false,
            extensions: vec!["cfg".to_string()],
        }
    }
}

impl Config {
    /// Parse configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, LocaleError> {
        toml::from_str(text).map_err(|source| LocaleError::Config {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load configuration from `path`.
    pub fn load(path: &Path) -> Result<Self, LocaleError> {
        let text = std::fs::read_to_string(path).map_err(|e| LocaleError::io(path, e))?;
        Self::from_toml(&text, path)
    }

    /// Load `locale.toml` from `dir` if it exists, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self, LocaleError> {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Whether `path` has one of the configured extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|x| x == ext))
    }
}
