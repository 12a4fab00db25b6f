//! SQL DDL for the content index.
//!
//! Creates the `skills`, `prompts`, `prompt_fragments`,
//! `prompt_fragment_skills`, `prompt_references` tables and the
//! `content_fts` virtual table.
//!
//! `content_fts` has no sync triggers: the reconcile pass writes it
//! explicitly through [`crate::SearchIndex`] so a mirroring failure surfaces
//! as an error inside the pass's transaction.

use rusqlite::Connection;

use crate::errors::Result;

/// Schema version stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i32 = 1;

/// Run all migrations.
///
/// Idempotent: every statement uses `IF NOT EXISTS`.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

/// Read the schema version of an opened database.
pub fn schema_version(conn: &Connection) -> Result<i32> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

const SCHEMA: &str = r"
-- Skills mirrored from disk
CREATE TABLE IF NOT EXISTS skills (
    id TEXT PRIMARY KEY,
    path TEXT NOT NULL UNIQUE,
    category TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL UNIQUE,
    title TEXT,
    description TEXT,
    content TEXT NOT NULL,
    file_hash TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    token_count INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_skills_category ON skills(category);

-- Prompts mirrored from disk
CREATE TABLE IF NOT EXISTS prompts (
    id TEXT PRIMARY KEY,
    path TEXT NOT NULL UNIQUE,
    category TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL UNIQUE,
    title TEXT,
    description TEXT,
    content TEXT NOT NULL,
    file_hash TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    token_count INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_prompts_category ON prompts(category);

-- Named, reusable skill groupings (authored, never scanned)
CREATE TABLE IF NOT EXISTS prompt_fragments (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    title TEXT,
    description TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS prompt_fragment_skills (
    fragment_id TEXT NOT NULL REFERENCES prompt_fragments(id) ON DELETE CASCADE,
    skill_id TEXT NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    PRIMARY KEY (fragment_id, skill_id)
);

CREATE INDEX IF NOT EXISTS idx_fragment_skills_skill
    ON prompt_fragment_skills(skill_id);

-- Ordered edges from a prompt to a skill, fragment or prompt.
-- target_fragment_id has no foreign key: deleting a fragment leaves
-- references to it dangling so resolution can report them.
CREATE TABLE IF NOT EXISTS prompt_references (
    id TEXT PRIMARY KEY,
    source_prompt_id TEXT NOT NULL REFERENCES prompts(id) ON DELETE CASCADE,
    reference_type TEXT NOT NULL
        CHECK(reference_type IN ('skill', 'fragment', 'prompt')),
    target_skill_id TEXT REFERENCES skills(id) ON DELETE CASCADE,
    target_fragment_id TEXT,
    target_prompt_id TEXT REFERENCES prompts(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    CHECK(
        (reference_type = 'skill' AND target_skill_id IS NOT NULL
            AND target_fragment_id IS NULL AND target_prompt_id IS NULL)
        OR (reference_type = 'fragment' AND target_fragment_id IS NOT NULL
            AND target_skill_id IS NULL AND target_prompt_id IS NULL)
        OR (reference_type = 'prompt' AND target_prompt_id IS NOT NULL
            AND target_skill_id IS NULL AND target_fragment_id IS NULL)
    )
);

CREATE INDEX IF NOT EXISTS idx_prompt_references_source
    ON prompt_references(source_prompt_id, position);
CREATE INDEX IF NOT EXISTS idx_prompt_references_fragment
    ON prompt_references(target_fragment_id) WHERE target_fragment_id IS NOT NULL;

-- Full-text search over both kinds
CREATE VIRTUAL TABLE IF NOT EXISTS content_fts USING fts5(
    path UNINDEXED,
    kind UNINDEXED,
    name,
    title,
    description,
    content,
    tokenize='porter unicode61'
);
";
