//! Reconciliation of scanned files against persisted rows.
//!
//! [`plan`] is pure: it compares observed records with persisted identities
//! by path and decides what to insert, update, keep and delete. [`apply`]
//! executes a plan on a connection (normally an open transaction), mirroring
//! every primary write into the search index.

use std::collections::{HashMap, HashSet};

use rusqlite::Connection;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use quire_core::constants::BYTES_PER_TOKEN;
use quire_core::{ContentKind, parse_document};
use quire_store::{ContentRecord, ContentRepository, PersistedFile, SearchIndex, StoreError};

use crate::errors::{Result, SyncError};
use crate::scanner::ScannedFile;

/// SHA-256 hex digest of `content`.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Derive the row values for one scanned file.
///
/// Frontmatter problems only cost the title and description.
pub fn observe(file: &ScannedFile) -> ContentRecord {
    let frontmatter = parse_document(&file.content).frontmatter;
    let len = file.content.len();
    ContentRecord {
        path: file.path_string(),
        category: file.category(),
        name: file.name(),
        title: frontmatter.display_title(),
        description: frontmatter.description,
        content: file.content.clone(),
        file_hash: content_hash(&file.content),
        size_bytes: i64::try_from(len).unwrap_or(i64::MAX),
        token_count: i64::try_from(len / BYTES_PER_TOKEN).unwrap_or(i64::MAX),
    }
}

/// A changed file and the row it refreshes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpdate {
    /// Existing row id.
    pub id: String,
    /// New values.
    pub record: ContentRecord,
}

/// Mutations for one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Kind being reconciled.
    pub kind: ContentKind,
    /// New paths.
    pub inserts: Vec<ContentRecord>,
    /// Paths whose hash changed.
    pub updates: Vec<PlannedUpdate>,
    /// Paths kept as they are.
    pub unchanged: Vec<String>,
    /// Rows whose file disappeared.
    pub deletes: Vec<PersistedFile>,
}

impl ReconcilePlan {
    /// Whether applying the plan would write anything.
    pub fn is_noop(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

/// Paths touched by applying one plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KindReport {
    /// Newly indexed paths.
    pub inserted: Vec<String>,
    /// Refreshed paths.
    pub updated: Vec<String>,
    /// Paths left alone.
    pub unchanged: Vec<String>,
    /// Removed paths.
    pub deleted: Vec<String>,
}

/// Plan the reconciliation of one kind.
///
/// Persisted rows whose path is in `protected_paths` (files skipped by the
/// scanner this pass) are kept even though they were not observed. Two
/// observed files deriving the same name fail with
/// [`SyncError::DuplicateName`], as does an observed file taking the name of
/// a kept row.
pub fn plan(
    kind: ContentKind,
    observed: Vec<ContentRecord>,
    existing: Vec<PersistedFile>,
    protected_paths: &HashSet<String>,
) -> Result<ReconcilePlan> {
    let mut names: HashMap<&str, &str> = HashMap::new();
    for record in &observed {
        if let Some(first) = names.insert(&record.name, &record.path) {
            return Err(SyncError::DuplicateName {
                kind,
                name: record.name.clone(),
                first: first.to_string(),
                second: record.path.clone(),
            });
        }
    }

    // A kept row still holds its name.
    for row in existing.iter().filter(|row| protected_paths.contains(&row.path)) {
        match names.get(row.name.as_str()) {
            Some(&observed_path) if observed_path != row.path => {
                return Err(SyncError::DuplicateName {
                    kind,
                    name: row.name.clone(),
                    first: row.path.clone(),
                    second: observed_path.to_string(),
                });
            }
            _ => {}
        }
    }

    let mut by_path: HashMap<String, PersistedFile> = existing
        .into_iter()
        .map(|file| (file.path.clone(), file))
        .collect();

    let mut result = ReconcilePlan {
        kind,
        inserts: Vec::new(),
        updates: Vec::new(),
        unchanged: Vec::new(),
        deletes: Vec::new(),
    };

    for record in observed {
        match by_path.remove(&record.path) {
            None => result.inserts.push(record),
            Some(row) if row.file_hash != record.file_hash => {
                result.updates.push(PlannedUpdate { id: row.id, record });
            }
            Some(_) => result.unchanged.push(record.path),
        }
    }

    let mut leftovers: Vec<PersistedFile> = by_path.into_values().collect();
    leftovers.sort_by(|a, b| a.path.cmp(&b.path));
    for row in leftovers {
        if protected_paths.contains(&row.path) {
            result.unchanged.push(row.path);
        } else {
            result.deletes.push(row);
        }
    }
    result.unchanged.sort();

    Ok(result)
}

/// Execute a plan. Any failure names the path being written.
///
/// Deletes run first so a file moved between directories can take over
/// its old name in the same pass.
pub fn apply(conn: &Connection, plan: &ReconcilePlan) -> Result<KindReport> {
    let kind = plan.kind;
    let mut report = KindReport {
        unchanged: plan.unchanged.clone(),
        ..KindReport::default()
    };

    for row in &plan.deletes {
        let fail = |source| SyncError::Reconcile {
            path: row.path.clone(),
            source,
        };
        let _ = ContentRepository::delete(conn, kind, &row.id).map_err(fail)?;
        let _ = SearchIndex::deindex(conn, kind, &row.path).map_err(fail)?;
        debug!(%kind, path = %row.path, "deleted");
        report.deleted.push(row.path.clone());
    }

    for update in &plan.updates {
        let path = &update.record.path;
        let fail = |source| SyncError::Reconcile {
            path: path.clone(),
            source,
        };
        let item = ContentRepository::update_content(conn, kind, &update.id, &update.record)
            .map_err(fail)?
            .ok_or_else(|| fail(StoreError::not_found("Content", &update.id)))?;
        SearchIndex::index(conn, &item).map_err(fail)?;
        debug!(%kind, path = %path, "updated");
        report.updated.push(path.clone());
    }

    for record in &plan.inserts {
        let fail = |source| SyncError::Reconcile {
            path: record.path.clone(),
            source,
        };
        let item = ContentRepository::insert(conn, kind, record).map_err(fail)?;
        SearchIndex::index(conn, &item).map_err(fail)?;
        debug!(%kind, path = %record.path, id = %item.id, "inserted");
        report.inserted.push(record.path.clone());
    }

    Ok(report)
}
