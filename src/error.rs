//! Typed errors for the library boundary.
//!
//! Absence of data (empty corpus, no cache entry, no matches) is never an
//! error. Only caller mistakes and persistence failures surface here.

use thiserror::Error;

/// Errors returned by the public search API.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The caller passed an argument the API cannot accept
    /// (negative distance, empty query word, unparsable distance).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The persisted index could not be used.
    #[error("Index cache error: {0}")]
    Cache(String),

    /// Reading or writing the persistence boundary failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding a persisted index failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SearchError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        SearchError::InvalidArgument(msg.into())
    }

    /// True when the error was caused by the caller rather than the environment.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, SearchError::InvalidArgument(_))
    }
}

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, SearchError>;
