//! Entity identifiers.
//!
//! Every persisted row gets a prefixed UUID v7 (`skill-…`, `prompt-…`,
//! `frag-…`, `ref-…`), so ids sort by creation time and reveal their kind
//! when they show up in error chains.

use uuid::Uuid;

use crate::errors::ValidationError;

/// Prefix for skill ids.
pub const SKILL_PREFIX: &str = "skill";
/// Prefix for prompt ids.
pub const PROMPT_PREFIX: &str = "prompt";
/// Prefix for fragment ids.
pub const FRAGMENT_PREFIX: &str = "frag";
/// Prefix for prompt reference ids.
pub const REFERENCE_PREFIX: &str = "ref";

/// Longest identifier accepted from callers.
const MAX_ID_LEN: usize = 256;

/// Generate a prefixed UUID v7 ID.
pub fn generate_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::now_v7())
}

/// Check that a caller-supplied identifier (id or name) is well-formed.
///
/// Identifiers must be non-empty, at most 256 bytes, and free of whitespace
/// and control characters.
pub fn validate_id(kind: &str, id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::new(format!("{kind} id must not be empty")));
    }
    if id.len() > MAX_ID_LEN {
        return Err(ValidationError::new(format!(
            "{kind} id is longer than {MAX_ID_LEN} bytes"
        )));
    }
    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::new(format!(
            "{kind} id contains whitespace or control characters: {id:?}"
        )));
    }
    Ok(())
}

/// Get current UTC timestamp as ISO 8601 string with millisecond precision.
pub fn now_iso() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_prefix() {
        let id = generate_id(SKILL_PREFIX);
        assert!(id.starts_with("skill-"));
        assert_eq!(id.len(), "skill-".len() + 36);
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(generate_id(REFERENCE_PREFIX), generate_id(REFERENCE_PREFIX));
    }

    #[test]
    fn validate_accepts_ids_and_names() {
        assert!(validate_id("prompt", "prompt-0190a1b2").is_ok());
        assert!(validate_id("prompt", "test_fragments_refs").is_ok());
    }

    #[test]
    fn validate_rejects_empty() {
        let err = validate_id("prompt", "").unwrap_err();
        assert!(err.message().contains("empty"));
    }

    #[test]
    fn validate_rejects_whitespace() {
        assert!(validate_id("fragment", "db basics").is_err());
        assert!(validate_id("fragment", "db\tbasics").is_err());
        assert!(validate_id("fragment", "db\u{0}").is_err());
    }

    #[test]
    fn validate_rejects_overlong() {
        let long = "x".repeat(MAX_ID_LEN + 1);
        assert!(validate_id("skill", &long).is_err());
    }

    #[test]
    fn now_iso_has_millis() {
        let ts = now_iso();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2026-01-01T00:00:00.000Z".len());
    }
}
