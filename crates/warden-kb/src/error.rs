//! Store error types.

use thiserror::Error;

/// Errors returned by the knowledge-base store.
#[derive(Debug, Error)]
pub enum KbError {
    /// The document changed since the preview the caller is holding.
    /// The document on disk is untouched.
    #[error("conflict: {path} changed since preview (expected {expected}, found {actual})")]
    Conflict {
        /// Scope-relative path of the document.
        path: String,
        /// The hash the caller expected to find.
        expected: String,
        /// The hash actually on disk.
        actual: String,
    },

    /// A scope segment contained a path separator, `..`, or was empty.
    #[error("invalid scope segment {segment:?}: {reason}")]
    InvalidScope {
        /// The offending segment.
        segment: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A document path was absolute, empty, or escaped the scope root.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The document does not exist (and is not the default, which is
    /// created on demand).
    #[error("document not found: {path}")]
    NotFound {
        /// Scope-relative path of the document.
        path: String,
    },

    /// Underlying filesystem failure.
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type KbResult<T> = Result<T, KbError>;
