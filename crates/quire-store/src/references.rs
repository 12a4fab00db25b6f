//! SQL data access for prompt references.

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use quire_core::ids::{REFERENCE_PREFIX, generate_id, now_iso};
use quire_core::{ContentKind, PromptReference, ReferenceTarget, ReferenceType};

use crate::content::ContentRepository;
use crate::errors::{Result, StoreError};
use crate::fragments::FragmentRepository;

/// Parameters for creating a reference, in the table's column layout.
#[derive(Debug, Clone)]
pub struct ReferenceCreateParams {
    /// Owning prompt.
    pub source_prompt_id: String,
    /// Declared reference type.
    pub reference_type: ReferenceType,
    /// Target skill, for `skill` references.
    pub target_skill_id: Option<String>,
    /// Target fragment, for `fragment` references.
    pub target_fragment_id: Option<String>,
    /// Target prompt, for `prompt` references.
    pub target_prompt_id: Option<String>,
    /// Position; `None` appends after the current last reference.
    pub position: Option<i64>,
}

impl ReferenceCreateParams {
    /// Params for a reference to `target`.
    pub fn new(source_prompt_id: impl Into<String>, target: &ReferenceTarget) -> Self {
        let (skill, fragment, prompt) = target.to_columns();
        Self {
            source_prompt_id: source_prompt_id.into(),
            reference_type: target.reference_type(),
            target_skill_id: skill.map(ToString::to_string),
            target_fragment_id: fragment.map(ToString::to_string),
            target_prompt_id: prompt.map(ToString::to_string),
            position: None,
        }
    }

    /// Set an explicit position.
    #[must_use]
    pub fn at(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }
}

/// Reference repository for SQL CRUD operations.
pub struct ReferenceRepository;

impl ReferenceRepository {
    /// Create a reference after validating its shape and that both ends exist.
    pub fn create(conn: &Connection, params: &ReferenceCreateParams) -> Result<PromptReference> {
        let target = ReferenceTarget::from_columns(
            params.reference_type.as_sql(),
            params.target_skill_id.clone(),
            params.target_fragment_id.clone(),
            params.target_prompt_id.clone(),
        )?;

        if ContentRepository::get(conn, ContentKind::Prompt, &params.source_prompt_id)?.is_none() {
            return Err(StoreError::not_found("Prompt", &params.source_prompt_id));
        }
        let target_exists = match &target {
            ReferenceTarget::Skill(id) => ContentRepository::get(conn, ContentKind::Skill, id)?.is_some(),
            ReferenceTarget::Fragment(id) => FragmentRepository::get(conn, id)?.is_some(),
            ReferenceTarget::Prompt(id) => ContentRepository::get(conn, ContentKind::Prompt, id)?.is_some(),
        };
        if !target_exists {
            let entity = match target.reference_type() {
                ReferenceType::Skill => "Skill",
                ReferenceType::Fragment => "Fragment",
                ReferenceType::Prompt => "Prompt",
            };
            return Err(StoreError::not_found(entity, target.id()));
        }

        let position = match params.position {
            Some(p) => p,
            None => Self::next_position(conn, &params.source_prompt_id)?,
        };
        let id = generate_id(REFERENCE_PREFIX);
        let now = now_iso();
        let (skill, fragment, prompt) = target.to_columns();
        let _ = conn.execute(
            "INSERT INTO prompt_references
                (id, source_prompt_id, reference_type, target_skill_id, target_fragment_id,
                 target_prompt_id, position, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                params.source_prompt_id,
                target.reference_type().as_sql(),
                skill,
                fragment,
                prompt,
                position,
                now,
            ],
        )?;
        debug!(reference_id = %id, source = %params.source_prompt_id, target = %target.id(), position, "reference created");

        Ok(PromptReference {
            id,
            source_prompt_id: params.source_prompt_id.clone(),
            target,
            position,
            created_at: now,
        })
    }

    /// Get a reference by id.
    pub fn get(conn: &Connection, id: &str) -> Result<Option<PromptReference>> {
        let row = conn
            .query_row(
                "SELECT * FROM prompt_references WHERE id = ?1",
                params![id],
                ReferenceRow::from_row,
            )
            .optional()?;
        row.map(ReferenceRow::into_reference).transpose()
    }

    /// References owned by a prompt, in expansion order (`position`, then `id`).
    pub fn list_for_prompt(conn: &Connection, prompt_id: &str) -> Result<Vec<PromptReference>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM prompt_references
             WHERE source_prompt_id = ?1
             ORDER BY position, id",
        )?;
        let rows = stmt
            .query_map(params![prompt_id], ReferenceRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(ReferenceRow::into_reference).collect()
    }

    /// Delete a reference.
    pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let changed = conn.execute("DELETE FROM prompt_references WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Number of references.
    pub fn count(conn: &Connection) -> Result<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM prompt_references", [], |row| row.get(0))?)
    }

    fn next_position(conn: &Connection, prompt_id: &str) -> Result<i64> {
        let max: Option<i64> = conn.query_row(
            "SELECT MAX(position) FROM prompt_references WHERE source_prompt_id = ?1",
            params![prompt_id],
            |row| row.get(0),
        )?;
        Ok(max.map_or(1, |m| m + 1))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row converters
// ─────────────────────────────────────────────────────────────────────────────

struct ReferenceRow {
    id: String,
    source_prompt_id: String,
    reference_type: String,
    target_skill_id: Option<String>,
    target_fragment_id: Option<String>,
    target_prompt_id: Option<String>,
    position: i64,
    created_at: String,
}

impl ReferenceRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            source_prompt_id: row.get("source_prompt_id")?,
            reference_type: row.get("reference_type")?,
            target_skill_id: row.get("target_skill_id")?,
            target_fragment_id: row.get("target_fragment_id")?,
            target_prompt_id: row.get("target_prompt_id")?,
            position: row.get("position")?,
            created_at: row.get("created_at")?,
        })
    }

    fn into_reference(self) -> Result<PromptReference> {
        let target = ReferenceTarget::from_columns(
            &self.reference_type,
            self.target_skill_id,
            self.target_fragment_id,
            self.target_prompt_id,
        )?;
        Ok(PromptReference {
            id: self.id,
            source_prompt_id: self.source_prompt_id,
            target,
            position: self.position,
            created_at: self.created_at,
        })
    }
}
