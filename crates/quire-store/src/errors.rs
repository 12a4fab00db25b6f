//! Store error types.
//!
//! Store errors are **not** fail-silent: every caller either propagates them
//! or, inside a reconcile pass, lets them roll the transaction back.

use quire_core::ValidationError;
use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity type (e.g., "Skill", "Fragment").
        entity: &'static str,
        /// The id or name that was looked up.
        id: String,
    },

    /// Input rejected before touching the database.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl StoreError {
    /// Create a not-found error.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create a validation error from a message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(message))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = StoreError::not_found("Fragment", "frag-123");
        assert_eq!(err.to_string(), "Fragment not found: frag-123");
    }

    #[test]
    fn validation_display_is_transparent() {
        let err = StoreError::validation("limit must be at least 1");
        assert_eq!(err.to_string(), "Validation error: limit must be at least 1");
    }

    #[test]
    fn database_from_rusqlite() {
        let sqlite_err =
            rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(1), Some("test".to_string()));
        let err = StoreError::from(sqlite_err);
        assert!(err.to_string().contains("Database error"));
    }
}
