//! Error types for scanning and reconciliation.

use quire_core::ContentKind;
use quire_store::StoreError;

/// Fatal problems with a scan root. Per-file problems are
/// [`crate::ScanIssue`] values instead.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The root does not exist or cannot be resolved.
    #[error("Scan root does not exist: {path}")]
    MissingRoot {
        /// Root as given.
        path: String,
    },

    /// The root exists but is not a directory.
    #[error("Scan root is not a directory: {path}")]
    NotADirectory {
        /// Resolved root.
        path: String,
    },
}

/// Errors that abort a reconcile pass. Nothing is written when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A scan root was unusable.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Two observed files of one kind derive the same name.
    #[error("Duplicate {kind} name {name:?}: {first} and {second}")]
    DuplicateName {
        /// Kind of both files.
        kind: ContentKind,
        /// Shared derived name.
        name: String,
        /// First path in scan order.
        first: String,
        /// Second path in scan order.
        second: String,
    },

    /// Writing or mirroring one row failed; the pass was rolled back.
    #[error("Sync failed, no changes applied: {path}: {source}")]
    Reconcile {
        /// Path of the file being written.
        path: String,
        /// Underlying store failure.
        source: StoreError,
    },

    /// Reading persisted state or committing failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for SyncError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Store(StoreError::Database(e))
    }
}

/// Convenience alias for sync results.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconcile_error_names_path() {
        let err = SyncError::Reconcile {
            path: "/skills/malli.md".into(),
            source: StoreError::not_found("Skill", "skill-1"),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Sync failed, no changes applied"));
        assert!(msg.contains("/skills/malli.md"));
    }

    #[test]
    fn duplicate_name_display() {
        let err = SyncError::DuplicateName {
            kind: ContentKind::Skill,
            name: "intro".into(),
            first: "/a/intro.md".into(),
            second: "/b/intro.md".into(),
        };
        assert_eq!(
            err.to_string(),
            r#"Duplicate skill name "intro": /a/intro.md and /b/intro.md"#
        );
    }

    #[test]
    fn scan_error_is_transparent() {
        let err: SyncError = ScanError::MissingRoot { path: "/nope".into() }.into();
        assert_eq!(err.to_string(), "Scan root does not exist: /nope");
    }
}
