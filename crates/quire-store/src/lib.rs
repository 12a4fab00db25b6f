//! # quire-store
//!
//! `SQLite` persistence for skills, prompts, fragments and prompt references,
//! plus the FTS5 [`SearchIndex`] mirrored from the content tables.
//!
//! Every repository is stateless: methods take a `&Connection` (a
//! `rusqlite::Transaction` derefs to one) so callers decide the
//! transactional boundary.

#![deny(unsafe_code)]

pub mod connection;
pub mod content;
pub mod errors;
pub mod fragments;
pub mod migrations;
pub mod references;
pub mod search;
pub mod stats;

pub use connection::{ConnectionConfig, open_file, open_in_memory};
pub use content::{ContentRecord, ContentRepository, PersistedFile};
pub use errors::{Result, StoreError};
pub use fragments::{FragmentCreateParams, FragmentRepository};
pub use migrations::run_migrations;
pub use references::{ReferenceCreateParams, ReferenceRepository};
pub use search::{SearchIndex, SearchOptions};
pub use stats::{StoreStats, stats};
