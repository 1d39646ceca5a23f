//! Error types for the Lexica library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`LexicaError`] enum. Lookup misses are deliberately *not* errors:
//! asking for an unknown word or document yields an empty set.
//!
//! # Examples
//!
//! ```
//! use lexica::error::{LexicaError, Result};
//!
//! fn validate(word: &str) -> Result<()> {
//!     if word.is_empty() {
//!         return Err(LexicaError::invalid_word("word must not be empty"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate("").is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Lexica operations.
#[derive(Error, Debug)]
pub enum LexicaError {
    /// Empty or malformed token handed to a mutation.
    #[error("Invalid word: {0}")]
    InvalidWord(String),

    /// Empty or otherwise unanswerable search pattern.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Unknown index structure kind requested.
    #[error("Unsupported index type: {0}")]
    IndexTypeUnsupported(String),

    /// Query or mutation attempted before any index was built.
    #[error("Index not built: {0}")]
    IndexNotBuilt(String),

    /// Corrupt or internally inconsistent persisted record.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// Index construction failures (empty corpus, bad input stream).
    #[error("Index error: {0}")]
    Index(String),

    /// I/O errors from the caller-supplied persistence sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with LexicaError.
pub type Result<T> = std::result::Result<T, LexicaError>;

impl LexicaError {
    /// Create a new invalid word error.
    pub fn invalid_word<S: Into<String>>(msg: S) -> Self {
        LexicaError::InvalidWord(msg.into())
    }

    /// Create a new invalid query error.
    pub fn invalid_query<S: Into<String>>(msg: S) -> Self {
        LexicaError::InvalidQuery(msg.into())
    }

    /// Create a new unsupported index type error.
    pub fn unsupported_index_type<S: Into<String>>(kind: S) -> Self {
        LexicaError::IndexTypeUnsupported(kind.into())
    }

    /// Create a new index-not-built error.
    pub fn not_built<S: Into<String>>(msg: S) -> Self {
        LexicaError::IndexNotBuilt(msg.into())
    }

    /// Create a new deserialization error.
    pub fn deserialization<S: Into<String>>(msg: S) -> Self {
        LexicaError::DeserializationError(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        LexicaError::Index(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = LexicaError::invalid_word("empty token");
        assert_eq!(error.to_string(), "Invalid word: empty token");

        let error = LexicaError::unsupported_index_type("btree");
        assert_eq!(error.to_string(), "Unsupported index type: btree");

        let error = LexicaError::not_built("patricia");
        assert_eq!(error.to_string(), "Index not built: patricia");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let lexica_error = LexicaError::from(io_error);

        match lexica_error {
            LexicaError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
