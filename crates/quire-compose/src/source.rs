//! Read access the resolver needs, behind a trait.

use rusqlite::Connection;

use quire_core::{ContentItem, ContentKind, PromptReference};
use quire_store::{ContentRepository, FragmentRepository, ReferenceRepository, Result};

/// Everything the resolver reads while walking a reference graph.
pub trait CompositionSource {
    /// Whether the prompt exists.
    fn prompt_exists(&self, prompt_id: &str) -> Result<bool>;

    /// The prompt's references in expansion order (`position`, then `id`).
    fn references(&self, prompt_id: &str) -> Result<Vec<PromptReference>>;

    /// Member skill ids of a fragment in render order, or `None` if the
    /// fragment does not exist.
    fn fragment_skills(&self, fragment_id: &str) -> Result<Option<Vec<String>>>;

    /// A skill row.
    fn skill(&self, skill_id: &str) -> Result<Option<ContentItem>>;
}

/// [`CompositionSource`] over the `SQLite` store.
pub struct SqliteSource<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteSource<'a> {
    /// Wrap a connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl CompositionSource for SqliteSource<'_> {
    fn prompt_exists(&self, prompt_id: &str) -> Result<bool> {
        Ok(ContentRepository::get(self.conn, ContentKind::Prompt, prompt_id)?.is_some())
    }

    fn references(&self, prompt_id: &str) -> Result<Vec<PromptReference>> {
        ReferenceRepository::list_for_prompt(self.conn, prompt_id)
    }

    fn fragment_skills(&self, fragment_id: &str) -> Result<Option<Vec<String>>> {
        if FragmentRepository::get(self.conn, fragment_id)?.is_none() {
            return Ok(None);
        }
        let members = FragmentRepository::skills(self.conn, fragment_id)?;
        Ok(Some(members.into_iter().map(|m| m.skill_id).collect()))
    }

    fn skill(&self, skill_id: &str) -> Result<Option<ContentItem>> {
        ContentRepository::get(self.conn, ContentKind::Skill, skill_id)
    }
}
