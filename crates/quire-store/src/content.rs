//! SQL data access for file-backed content (skills and prompts).
//!
//! Both kinds share one row shape and live in sibling tables, so every
//! method takes the [`ContentKind`] and picks the table from it. Rows are
//! written only by the reconcile pass.

use rusqlite::{Connection, OptionalExtension, params};

use quire_core::ids::{generate_id, now_iso};
use quire_core::{ContentItem, ContentKind};

use crate::errors::Result;

const COLUMNS: &str = "id, path, category, name, title, description, content, file_hash, \
                       size_bytes, token_count, created_at, updated_at";

/// Values derived from one scanned file, as written to a content row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    /// Source file path.
    pub path: String,
    /// Directory relative to the scan root.
    pub category: String,
    /// File stem.
    pub name: String,
    /// Frontmatter title.
    pub title: Option<String>,
    /// Frontmatter description.
    pub description: Option<String>,
    /// Raw content.
    pub content: String,
    /// SHA-256 hex digest of `content`.
    pub file_hash: String,
    /// Content length in bytes.
    pub size_bytes: i64,
    /// Approximate token count.
    pub token_count: i64,
}

/// The persisted identity of one content row, used for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedFile {
    /// Row id.
    pub id: String,
    /// Source path.
    pub path: String,
    /// Derived name.
    pub name: String,
    /// Stored digest.
    pub file_hash: String,
}

/// Content repository for SQL CRUD operations.
pub struct ContentRepository;

impl ContentRepository {
    /// Insert a new row. Indexing it is left to the caller.
    pub fn insert(conn: &Connection, kind: ContentKind, record: &ContentRecord) -> Result<ContentItem> {
        let id = generate_id(kind.id_prefix());
        let now = now_iso();
        let sql = format!(
            "INSERT INTO {} ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            kind.table()
        );
        let _ = conn.execute(
            &sql,
            params![
                id,
                record.path,
                record.category,
                record.name,
                record.title,
                record.description,
                record.content,
                record.file_hash,
                record.size_bytes,
                record.token_count,
                now,
            ],
        )?;
        Ok(ContentItem {
            id,
            kind,
            path: record.path.clone(),
            category: record.category.clone(),
            name: record.name.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            content: record.content.clone(),
            file_hash: record.file_hash.clone(),
            size_bytes: record.size_bytes,
            token_count: record.token_count,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Refresh the content of an existing row, keeping `id` and `created_at`.
    ///
    /// Returns the updated row, or `None` if no row has that id.
    pub fn update_content(
        conn: &Connection,
        kind: ContentKind,
        id: &str,
        record: &ContentRecord,
    ) -> Result<Option<ContentItem>> {
        let sql = format!(
            "UPDATE {} SET content = ?1, file_hash = ?2, size_bytes = ?3, token_count = ?4,
                 title = ?5, description = ?6, category = ?7, name = ?8, updated_at = ?9
             WHERE id = ?10",
            kind.table()
        );
        let changed = conn.execute(
            &sql,
            params![
                record.content,
                record.file_hash,
                record.size_bytes,
                record.token_count,
                record.title,
                record.description,
                record.category,
                record.name,
                now_iso(),
                id,
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get(conn, kind, id)
    }

    /// Delete a row. Dependent associations and references cascade.
    pub fn delete(conn: &Connection, kind: ContentKind, id: &str) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", kind.table());
        let changed = conn.execute(&sql, params![id])?;
        Ok(changed > 0)
    }

    /// Get a row by id.
    pub fn get(conn: &Connection, kind: ContentKind, id: &str) -> Result<Option<ContentItem>> {
        Self::get_by(conn, kind, "id", id)
    }

    /// Get a row by name.
    pub fn find_by_name(conn: &Connection, kind: ContentKind, name: &str) -> Result<Option<ContentItem>> {
        Self::get_by(conn, kind, "name", name)
    }

    /// Get a row by path.
    pub fn find_by_path(conn: &Connection, kind: ContentKind, path: &str) -> Result<Option<ContentItem>> {
        Self::get_by(conn, kind, "path", path)
    }

    /// Look a row up by id, falling back to name.
    pub fn find(conn: &Connection, kind: ContentKind, id_or_name: &str) -> Result<Option<ContentItem>> {
        match Self::get(conn, kind, id_or_name)? {
            Some(item) => Ok(Some(item)),
            None => Self::find_by_name(conn, kind, id_or_name),
        }
    }

    fn get_by(conn: &Connection, kind: ContentKind, column: &str, value: &str) -> Result<Option<ContentItem>> {
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE {column} = ?1", kind.table());
        let item = conn
            .query_row(&sql, params![value], |row| item_from_row(row, kind))
            .optional()?;
        Ok(item)
    }

    /// List all rows of a kind ordered by path.
    pub fn list(conn: &Connection, kind: ContentKind) -> Result<Vec<ContentItem>> {
        let sql = format!("SELECT {COLUMNS} FROM {} ORDER BY path", kind.table());
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map([], |row| item_from_row(row, kind))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Identity and digest of every persisted row of a kind.
    pub fn persisted_files(conn: &Connection, kind: ContentKind) -> Result<Vec<PersistedFile>> {
        let sql = format!("SELECT id, path, name, file_hash FROM {} ORDER BY path", kind.table());
        let mut stmt = conn.prepare(&sql)?;
        let files = stmt
            .query_map([], |row| {
                Ok(PersistedFile {
                    id: row.get(0)?,
                    path: row.get(1)?,
                    name: row.get(2)?,
                    file_hash: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(files)
    }

    /// Source paths of every row of a kind, ordered.
    pub fn paths(conn: &Connection, kind: ContentKind) -> Result<Vec<String>> {
        let sql = format!("SELECT path FROM {} ORDER BY path", kind.table());
        let mut stmt = conn.prepare(&sql)?;
        let paths = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(paths)
    }

    /// Number of rows of a kind.
    pub fn count(conn: &Connection, kind: ContentKind) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        Ok(conn.query_row(&sql, [], |row| row.get(0))?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row converters
// ─────────────────────────────────────────────────────────────────────────────

fn item_from_row(row: &rusqlite::Row<'_>, kind: ContentKind) -> rusqlite::Result<ContentItem> {
    Ok(ContentItem {
        id: row.get("id")?,
        kind,
        path: row.get("path")?,
        category: row.get("category")?,
        name: row.get("name")?,
        title: row.get("title")?,
        description: row.get("description")?,
        content: row.get("content")?,
        file_hash: row.get("file_hash")?,
        size_bytes: row.get("size_bytes")?,
        token_count: row.get("token_count")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
