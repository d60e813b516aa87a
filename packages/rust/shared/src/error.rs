//! Error types for deepnotes.
//!
//! Library crates use [`DeepNotesError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Every variant is fatal to the pipeline that raised it. Content problems
//! (bad headers, unknown blocks, odd math markup) are absorbed where they
//! occur and never become an error value.

use std::path::PathBuf;

/// Top-level error type for all deepnotes operations.
#[derive(Debug, thiserror::Error)]
pub enum DeepNotesError {
    /// Missing credentials, directories, destination paths, or a bad config file.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport failure talking to the Notion API.
    #[error("network error: {0}")]
    Network(String),

    /// The Notion API answered with a non-success status.
    #[error("notion API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// A response body or config artifact could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML/TOML emission failed.
    #[error("serialization error: {0}")]
    Serialize(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DeepNotesError>;

impl DeepNotesError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
