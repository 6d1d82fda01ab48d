//! Error types for Dossier.
//!
//! Library crates use [`DossierError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Dossier operations.
#[derive(Debug, thiserror::Error)]
pub enum DossierError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Caller-supplied input is missing or malformed (maps to HTTP 400).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Unknown record or absent required document (maps to HTTP 404).
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Both artifact retrieval strategies exhausted (maps to HTTP 502).
    #[error("retrieval error: {0}")]
    Retrieval(String),

    /// Document merge failure (malformed source document).
    #[error("merge error: {0}")]
    Merge(String),

    /// Blob upload or record write failure during publication.
    #[error("publish error: {0}")]
    Publish(String),

    /// Survey report rendering failure.
    #[error("report error: {0}")]
    Report(String),

    /// Record store or blob store error outside the publish step.
    #[error("store error: {0}")]
    Store(String),

    /// Network/HTTP transport error.
    #[error("network error: {0}")]
    Network(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DossierError>;

impl DossierError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a not-found error from any displayable message.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DossierError::config("missing service key");
        assert_eq!(err.to_string(), "config error: missing service key");

        let err = DossierError::not_found("process ABC123 not found");
        assert!(err.to_string().contains("ABC123"));

        let err = DossierError::Retrieval("both strategies exhausted".into());
        assert_eq!(
            err.to_string(),
            "retrieval error: both strategies exhausted"
        );
    }
}
