//! SQL data access for prompt fragments and their skill memberships.

use rusqlite::{Connection, OptionalExtension, params};

use quire_core::ids::{FRAGMENT_PREFIX, generate_id, now_iso, validate_id};
use quire_core::{ContentKind, FragmentSkill, PromptFragment};

use crate::content::ContentRepository;
use crate::errors::{Result, StoreError};

/// Parameters for creating a fragment.
#[derive(Debug, Clone, Default)]
pub struct FragmentCreateParams {
    /// Unique name.
    pub name: String,
    /// Optional title.
    pub title: Option<String>,
    /// Optional description.
    pub description: Option<String>,
}

/// Fragment repository for SQL CRUD operations.
pub struct FragmentRepository;

impl FragmentRepository {
    /// Create a new fragment. Names must be unique.
    pub fn create(conn: &Connection, params: &FragmentCreateParams) -> Result<PromptFragment> {
        validate_id("fragment", &params.name)?;
        if Self::find_by_name(conn, &params.name)?.is_some() {
            return Err(StoreError::validation(format!(
                "fragment name already exists: {}",
                params.name
            )));
        }

        let id = generate_id(FRAGMENT_PREFIX);
        let now = now_iso();
        let _ = conn.execute(
            "INSERT INTO prompt_fragments (id, name, title, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![id, params.name, params.title, params.description, now],
        )?;

        Self::get(conn, &id)?.ok_or_else(|| StoreError::not_found("Fragment", &id))
    }

    /// Get a fragment by id.
    pub fn get(conn: &Connection, id: &str) -> Result<Option<PromptFragment>> {
        let fragment = conn
            .query_row(
                "SELECT * FROM prompt_fragments WHERE id = ?1",
                params![id],
                fragment_from_row,
            )
            .optional()?;
        Ok(fragment)
    }

    /// Get a fragment by name.
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<PromptFragment>> {
        let fragment = conn
            .query_row(
                "SELECT * FROM prompt_fragments WHERE name = ?1",
                params![name],
                fragment_from_row,
            )
            .optional()?;
        Ok(fragment)
    }

    /// Look a fragment up by id, falling back to name.
    pub fn find(conn: &Connection, id_or_name: &str) -> Result<Option<PromptFragment>> {
        match Self::get(conn, id_or_name)? {
            Some(fragment) => Ok(Some(fragment)),
            None => Self::find_by_name(conn, id_or_name),
        }
    }

    /// List fragments ordered by name.
    pub fn list(conn: &Connection) -> Result<Vec<PromptFragment>> {
        let mut stmt = conn.prepare("SELECT * FROM prompt_fragments ORDER BY name")?;
        let fragments = stmt
            .query_map([], fragment_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(fragments)
    }

    /// Delete a fragment and its memberships.
    ///
    /// Prompt references to the fragment are left in place and become
    /// dangling; resolving such a prompt reports the missing fragment.
    pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let changed = conn.execute("DELETE FROM prompt_fragments WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Memberships
    // ─────────────────────────────────────────────────────────────────────

    /// Add a skill to a fragment, or move it if it is already a member.
    pub fn add_skill(
        conn: &Connection,
        fragment_id: &str,
        skill_id: &str,
        position: i64,
    ) -> Result<FragmentSkill> {
        if Self::get(conn, fragment_id)?.is_none() {
            return Err(StoreError::not_found("Fragment", fragment_id));
        }
        if ContentRepository::get(conn, ContentKind::Skill, skill_id)?.is_none() {
            return Err(StoreError::not_found("Skill", skill_id));
        }

        let _ = conn.execute(
            "INSERT INTO prompt_fragment_skills (fragment_id, skill_id, position)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(fragment_id, skill_id) DO UPDATE SET position = excluded.position",
            params![fragment_id, skill_id, position],
        )?;
        Self::touch(conn, fragment_id)?;

        Ok(FragmentSkill {
            fragment_id: fragment_id.to_string(),
            skill_id: skill_id.to_string(),
            position,
        })
    }

    /// Remove a skill from a fragment.
    pub fn remove_skill(conn: &Connection, fragment_id: &str, skill_id: &str) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM prompt_fragment_skills WHERE fragment_id = ?1 AND skill_id = ?2",
            params![fragment_id, skill_id],
        )?;
        if changed > 0 {
            Self::touch(conn, fragment_id)?;
        }
        Ok(changed > 0)
    }

    /// Memberships of a fragment in render order (`position`, then `skill_id`).
    pub fn skills(conn: &Connection, fragment_id: &str) -> Result<Vec<FragmentSkill>> {
        let mut stmt = conn.prepare(
            "SELECT fragment_id, skill_id, position FROM prompt_fragment_skills
             WHERE fragment_id = ?1
             ORDER BY position, skill_id",
        )?;
        let skills = stmt
            .query_map(params![fragment_id], |row| {
                Ok(FragmentSkill {
                    fragment_id: row.get(0)?,
                    skill_id: row.get(1)?,
                    position: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(skills)
    }

    /// Number of fragments.
    pub fn count(conn: &Connection) -> Result<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM prompt_fragments", [], |row| row.get(0))?)
    }

    fn touch(conn: &Connection, fragment_id: &str) -> Result<()> {
        let _ = conn.execute(
            "UPDATE prompt_fragments SET updated_at = ?1 WHERE id = ?2",
            params![now_iso(), fragment_id],
        )?;
        Ok(())
    }
}

fn fragment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PromptFragment> {
    Ok(PromptFragment {
        id: row.get("id")?,
        name: row.get("name")?,
        title: row.get("title")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
