//! Error types for catalog, dialect and file handling

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types organized by layer
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // Format Errors (dialect structure)
    // ─────────────────────────────────────────────────────────────
    #[error("Format error: missing OptionSettings block")]
    MissingBlock,

    #[error("Format error: block span {start}..{end} no longer matches the file content")]
    SpanMismatch { start: usize, end: usize },

    // ─────────────────────────────────────────────────────────────
    // Coercion Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Cannot convert '{raw}' to {expected} for setting '{name}'")]
    Coercion {
        name: String,
        raw: String,
        expected: &'static str,
    },

    // ─────────────────────────────────────────────────────────────
    // Catalog Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Catalog error: {message}")]
    Catalog { message: String },

    #[error("Catalog error: setting '{name}' is defined more than once")]
    DuplicateSetting { name: String },

    #[error("Catalog error: enum setting '{name}' has no options")]
    EmptyEnumOptions { name: String },

    #[error("Unknown setting: {name}")]
    UnknownSetting { name: String },

    // ─────────────────────────────────────────────────────────────
    // Registry/Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Unknown game module: {id}")]
    UnknownGame { id: String },

    #[error("Could not detect which game {path} belongs to")]
    UndetectedGame { path: PathBuf },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Import error: {message}")]
    Import { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    pub fn coercion(name: impl Into<String>, raw: impl Into<String>, expected: &'static str) -> Self {
        Self::Coercion {
            name: name.into(),
            raw: raw.into(),
            expected,
        }
    }

    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    pub fn unknown_setting(name: impl Into<String>) -> Self {
        Self::UnknownSetting { name: name.into() }
    }

    pub fn unknown_game(id: impl Into<String>) -> Self {
        Self::UnknownGame { id: id.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn import(message: impl Into<String>) -> Self {
        Self::Import {
            message: message.into(),
        }
    }

    /// Structural problems with the OptionSettings block
    pub fn is_format_error(&self) -> bool {
        matches!(self, Error::MissingBlock | Error::SpanMismatch { .. })
    }

    /// Check if this is a recoverable error
    ///
    /// A missing block means the caller may treat the file as plain INI; a
    /// span mismatch is fixed by re-parsing; a coercion failure lets the
    /// caller pick a fallback value.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::MissingBlock
                | Error::SpanMismatch { .. }
                | Error::Coercion { .. }
                | Error::UndetectedGame { .. }
                | Error::Import { .. }
        )
    }

    /// Check if this error should abort startup of the settings subsystem
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Catalog { .. } | Error::DuplicateSetting { .. } | Error::EmptyEnumOptions { .. }
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}
