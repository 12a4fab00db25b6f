//! Row counts across the store.

use rusqlite::Connection;
use serde::Serialize;

use quire_core::ContentKind;

use crate::content::ContentRepository;
use crate::errors::Result;
use crate::fragments::FragmentRepository;
use crate::references::ReferenceRepository;
use crate::search::SearchIndex;

/// Counts of every persisted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    /// Skill rows.
    pub skills: i64,
    /// Prompt rows.
    pub prompts: i64,
    /// Fragments.
    pub fragments: i64,
    /// Prompt references.
    pub references: i64,
    /// Rows in the search index; equals `skills + prompts` after a sync.
    pub indexed: i64,
}

/// Count every table.
pub fn stats(conn: &Connection) -> Result<StoreStats> {
    Ok(StoreStats {
        skills: ContentRepository::count(conn, ContentKind::Skill)?,
        prompts: ContentRepository::count(conn, ContentKind::Prompt)?,
        fragments: FragmentRepository::count(conn)?,
        references: ReferenceRepository::count(conn)?,
        indexed: SearchIndex::count(conn)?,
    })
}
