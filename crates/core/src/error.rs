use std::path::PathBuf;

/// Errors surfaced by the locale toolchain outside of validation.
///
/// Problems inside a locale document are never errors: they are reported as
/// diagnostics. This type covers the collaborators around the core, such as
/// reading files and loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum LocaleError {
    /// A file could not be read.
    #[error("error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file exists but is not valid TOML for [`crate::Config`].
    #[error("invalid configuration in '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl LocaleError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LocaleError::Io {
            path: path.into(),
            source,
        }
    }
}
