//! Validation error shared by every quire entry point.

use thiserror::Error;

/// Input rejected before any I/O took place.
///
/// Raised for empty or malformed search queries, out-of-range limits,
/// malformed identifiers, and prompt references whose target does not
/// match their declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation error: {0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    /// Build a validation error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// The human-readable reason.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_reason() {
        let err = ValidationError::new("limit must be positive");
        assert_eq!(err.to_string(), "Validation error: limit must be positive");
        assert_eq!(err.message(), "limit must be positive");
    }
}
