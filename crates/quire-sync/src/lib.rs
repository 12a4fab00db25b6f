//! # quire-sync
//!
//! Filesystem-to-store synchronization.
//!
//! A pass scans the skill and prompt roots, plans each kind against the
//! persisted rows, and applies both plans in one `SQLite` transaction. Every
//! primary write is mirrored into the search index inside that transaction,
//! so a pass either lands completely or not at all.
//!
//! ```text
//! scanner::scan ─▶ reconcile::observe ─▶ reconcile::plan ─▶ reconcile::apply
//!                                                             (one transaction)
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod reconcile;
pub mod scanner;

use std::collections::HashSet;
use std::path::PathBuf;

use rusqlite::Connection;
use serde::Serialize;
use tracing::{info, warn};

use quire_core::ContentKind;
use quire_store::ContentRepository;

pub use errors::{Result, ScanError, SyncError};
pub use reconcile::{KindReport, ReconcilePlan, apply, content_hash, observe, plan};
pub use scanner::{ScanIssue, ScanOptions, ScanOutput, ScannedFile, scan};

/// Inputs to one pass.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Directories holding skill files. Empty means skills are left alone.
    pub skill_roots: Vec<PathBuf>,
    /// Directories holding prompt files. Empty means prompts are left alone.
    pub prompt_roots: Vec<PathBuf>,
    /// Scanner settings shared by both kinds.
    pub scan: ScanOptions,
}

impl SyncConfig {
    /// Config with default scanner settings.
    pub fn new(skill_roots: Vec<PathBuf>, prompt_roots: Vec<PathBuf>) -> Self {
        Self {
            skill_roots,
            prompt_roots,
            scan: ScanOptions::default(),
        }
    }

    fn roots(&self, kind: ContentKind) -> &[PathBuf] {
        match kind {
            ContentKind::Skill => &self.skill_roots,
            ContentKind::Prompt => &self.prompt_roots,
        }
    }
}

/// Outcome of one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Skill paths by outcome.
    pub skills: KindReport,
    /// Prompt paths by outcome.
    pub prompts: KindReport,
    /// Files skipped by the scanner.
    pub skipped: Vec<ScanIssue>,
}

impl SyncReport {
    /// Number of rows inserted, updated or deleted.
    pub fn mutations(&self) -> usize {
        [&self.skills, &self.prompts]
            .iter()
            .map(|r| r.inserted.len() + r.updated.len() + r.deleted.len())
            .sum()
    }
}

/// Run one reconcile pass.
///
/// Scanning and planning finish before the first write, so scan errors and
/// duplicate names leave the store untouched. Any write or mirroring failure
/// drops the transaction, rolling the whole pass back.
pub fn sync(conn: &mut Connection, config: &SyncConfig) -> Result<SyncReport> {
    let mut scans = Vec::new();
    for kind in ContentKind::ALL {
        let roots = config.roots(kind);
        if roots.is_empty() {
            continue;
        }
        scans.push((kind, scan(roots, &config.scan)?));
    }

    let tx = conn.transaction()?;

    let mut report = SyncReport::default();
    let mut plans = Vec::new();
    for (kind, output) in scans {
        let protected: HashSet<String> = output.issues.iter().map(|i| i.path.clone()).collect();
        let observed = output.files.iter().map(observe).collect();
        let existing = ContentRepository::persisted_files(&tx, kind)?;
        plans.push(plan(kind, observed, existing, &protected)?);
        report.skipped.extend(output.issues);
    }

    for kind_plan in &plans {
        let kind_report = apply(&tx, kind_plan)?;
        match kind_plan.kind {
            ContentKind::Skill => report.skills = kind_report,
            ContentKind::Prompt => report.prompts = kind_report,
        }
    }

    tx.commit()?;

    if !report.skipped.is_empty() {
        warn!(count = report.skipped.len(), "files skipped during sync");
    }
    info!(
        skills_inserted = report.skills.inserted.len(),
        skills_updated = report.skills.updated.len(),
        skills_deleted = report.skills.deleted.len(),
        prompts_inserted = report.prompts.inserted.len(),
        prompts_updated = report.prompts.updated.len(),
        prompts_deleted = report.prompts.deleted.len(),
        "sync complete"
    );
    Ok(report)
}
