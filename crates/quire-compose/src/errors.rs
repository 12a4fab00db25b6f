//! Error types for composition.

use quire_core::{ReferenceType, ValidationError};
use quire_store::StoreError;

/// Errors raised while resolving or rendering a prompt.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// Malformed prompt id.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A prompt, fragment or skill on the reference graph does not exist.
    #[error("Cannot resolve {target_type} {id} (reference chain: {})", format_chain(.chain))]
    Resolution {
        /// Kind of the missing target.
        target_type: ReferenceType,
        /// Missing id.
        id: String,
        /// Prompt ids from the root down to the one holding the reference.
        chain: Vec<String>,
    },

    /// A prompt reaches itself through prompt references.
    #[error("Reference cycle: {}", format_chain(.cycle))]
    Composition {
        /// Prompt ids from the root, ending with the repeated one.
        cycle: Vec<String>,
    },

    /// Store read failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn format_chain(chain: &[String]) -> String {
    if chain.is_empty() {
        "(root)".to_string()
    } else {
        chain.join(" → ")
    }
}

/// Convenience alias for composition results.
pub type Result<T> = std::result::Result<T, ComposeError>;
