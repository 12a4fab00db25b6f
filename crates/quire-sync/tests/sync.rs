#![allow(unused_results)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_matches::assert_matches;
use rusqlite::Connection;
use tempfile::TempDir;

use quire_core::{ContentKind, ReferenceTarget};
use quire_store::{
    ContentRepository, FragmentCreateParams, FragmentRepository, ReferenceCreateParams,
    ReferenceRepository, SearchIndex, SearchOptions,
};
use quire_sync::{SyncConfig, SyncError, sync};

struct Fixture {
    _dir: TempDir,
    skills: PathBuf,
    prompts: PathBuf,
    conn: Connection,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let skills = dir.path().join("skills");
        let prompts = dir.path().join("prompts");
        fs::create_dir_all(&skills).unwrap();
        fs::create_dir_all(&prompts).unwrap();
        let conn = quire_store::open_in_memory().unwrap();
        quire_store::run_migrations(&conn).unwrap();
        Self {
            _dir: dir,
            skills,
            prompts,
            conn,
        }
    }

    fn config(&self) -> SyncConfig {
        SyncConfig::new(vec![self.skills.clone()], vec![self.prompts.clone()])
    }

    fn sync(&mut self) -> Result<quire_sync::SyncReport, SyncError> {
        let config = self.config();
        sync(&mut self.conn, &config)
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn skill(&self, rel: &str, content: &str) {
        Self::write(&self.skills, rel, content);
    }

    fn prompt(&self, rel: &str, content: &str) {
        Self::write(&self.prompts, rel, content);
    }

    fn assert_mirrored(&self) {
        for kind in ContentKind::ALL {
            assert_eq!(
                ContentRepository::paths(&self.conn, kind).unwrap(),
                SearchIndex::indexed_paths(&self.conn, kind).unwrap(),
                "search index out of step for {kind}"
            );
        }
    }
}

#[test]
fn first_pass_inserts_everything() {
    let mut fx = Fixture::new();
    fx.skill("clojure/malli.md", "---\ntitle: Malli\n---\n# Malli\n");
    fx.skill("intro.md", "# Intro\n");
    fx.prompt("onboarding.md", "# Onboarding\n");

    let report = fx.sync().unwrap();
    assert_eq!(report.skills.inserted.len(), 2);
    assert_eq!(report.prompts.inserted.len(), 1);
    assert!(report.skipped.is_empty());

    let malli = ContentRepository::find_by_name(&fx.conn, ContentKind::Skill, "malli")
        .unwrap()
        .unwrap();
    assert_eq!(malli.category, "clojure");
    assert_eq!(malli.title.as_deref(), Some("Malli"));
    assert_eq!(malli.file_hash, quire_sync::content_hash(&malli.content));
    fx.assert_mirrored();
}

#[test]
fn second_pass_is_idempotent() {
    let mut fx = Fixture::new();
    fx.skill("a.md", "a");
    fx.prompt("p.md", "p");
    fx.sync().unwrap();
    let before = ContentRepository::list(&fx.conn, ContentKind::Skill).unwrap();

    let report = fx.sync().unwrap();
    assert_eq!(report.mutations(), 0);
    assert_eq!(report.skills.unchanged.len(), 1);
    assert_eq!(ContentRepository::list(&fx.conn, ContentKind::Skill).unwrap(), before);
}

#[test]
fn changed_file_updates_in_place() {
    let mut fx = Fixture::new();
    fx.skill("a.md", "version one");
    fx.sync().unwrap();
    let original = ContentRepository::find_by_name(&fx.conn, ContentKind::Skill, "a")
        .unwrap()
        .unwrap();

    std::thread::sleep(std::time::Duration::from_millis(5));
    fx.skill("a.md", "---\ndescription: second\n---\nversion two");
    let report = fx.sync().unwrap();
    assert_eq!(report.skills.updated.len(), 1);

    let updated = ContentRepository::find_by_name(&fx.conn, ContentKind::Skill, "a")
        .unwrap()
        .unwrap();
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.created_at, original.created_at);
    assert!(updated.updated_at > original.updated_at);
    assert_ne!(updated.file_hash, original.file_hash);
    assert_eq!(updated.description.as_deref(), Some("second"));

    let hits = SearchIndex::search(&fx.conn, "two", &SearchOptions::default()).unwrap();
    assert_eq!(hits.len(), 1);
    assert!(SearchIndex::search(&fx.conn, "one", &SearchOptions::default())
        .unwrap()
        .is_empty());
    fx.assert_mirrored();
}

#[test]
fn removed_file_is_deleted_and_cascades() {
    let mut fx = Fixture::new();
    fx.skill("keep.md", "keep");
    fx.skill("doomed.md", "doomed");
    fx.prompt("p.md", "p");
    fx.sync().unwrap();

    let doomed = ContentRepository::find_by_name(&fx.conn, ContentKind::Skill, "doomed")
        .unwrap()
        .unwrap();
    let prompt = ContentRepository::find_by_name(&fx.conn, ContentKind::Prompt, "p")
        .unwrap()
        .unwrap();
    let fragment = FragmentRepository::create(
        &fx.conn,
        &FragmentCreateParams {
            name: "group".into(),
            ..Default::default()
        },
    )
    .unwrap();
    FragmentRepository::add_skill(&fx.conn, &fragment.id, &doomed.id, 1).unwrap();
    ReferenceRepository::create(
        &fx.conn,
        &ReferenceCreateParams::new(&prompt.id, &ReferenceTarget::Skill(doomed.id.clone())),
    )
    .unwrap();

    fs::remove_file(fx.skills.join("doomed.md")).unwrap();
    let report = fx.sync().unwrap();

    assert_eq!(report.skills.deleted.len(), 1);
    assert!(FragmentRepository::skills(&fx.conn, &fragment.id).unwrap().is_empty());
    assert!(ReferenceRepository::list_for_prompt(&fx.conn, &prompt.id)
        .unwrap()
        .is_empty());
    fx.assert_mirrored();
}

#[test]
fn moved_file_keeps_its_name() {
    let mut fx = Fixture::new();
    fx.skill("old/intro.md", "intro");
    fx.sync().unwrap();

    fs::remove_dir_all(fx.skills.join("old")).unwrap();
    fx.skill("new/intro.md", "intro");
    let report = fx.sync().unwrap();

    assert_eq!(report.skills.deleted.len(), 1);
    assert_eq!(report.skills.inserted.len(), 1);
    let moved = ContentRepository::find_by_name(&fx.conn, ContentKind::Skill, "intro")
        .unwrap()
        .unwrap();
    assert_eq!(moved.category, "new");
}

#[test]
fn skipped_file_keeps_its_row() {
    let mut fx = Fixture::new();
    fx.skill("big.md", "small for now");
    fx.sync().unwrap();

    fx.skill("big.md", &"x".repeat(128));
    let mut config = fx.config();
    config.scan.max_file_bytes = 64;
    let report = sync(&mut fx.conn, &config).unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert!(report.skills.deleted.is_empty());
    let row = ContentRepository::find_by_name(&fx.conn, ContentKind::Skill, "big")
        .unwrap()
        .unwrap();
    assert_eq!(row.content, "small for now");
}

#[test]
fn duplicate_names_abort_before_writing() {
    let mut fx = Fixture::new();
    fx.skill("a/intro.md", "one");
    fx.skill("b/intro.md", "two");
    fx.skill("unique.md", "three");

    let err = fx.sync().unwrap_err();
    assert_matches!(err, SyncError::DuplicateName { .. });
    assert_eq!(ContentRepository::count(&fx.conn, ContentKind::Skill).unwrap(), 0);
}

#[test]
fn new_file_cannot_take_a_skipped_files_name() {
    let mut fx = Fixture::new();
    fx.skill("old/intro.md", "short");
    fx.skill("other.md", "other");
    fx.sync().unwrap();

    fx.skill("old/intro.md", &"x".repeat(128));
    fx.skill("new/intro.md", "fresh");
    fx.skill("added.md", "added");
    let mut config = fx.config();
    config.scan.max_file_bytes = 64;

    let err = sync(&mut fx.conn, &config).unwrap_err();
    assert_matches!(
        err,
        SyncError::DuplicateName { kind: ContentKind::Skill, ref name, ref first, ref second }
            if name == "intro" && first.ends_with("old/intro.md") && second.ends_with("new/intro.md")
    );
    assert_eq!(ContentRepository::count(&fx.conn, ContentKind::Skill).unwrap(), 2);
    assert!(ContentRepository::find_by_name(&fx.conn, ContentKind::Skill, "added")
        .unwrap()
        .is_none());
    fx.assert_mirrored();
}

#[test]
fn same_name_across_kinds_is_fine() {
    let mut fx = Fixture::new();
    fx.skill("intro.md", "skill");
    fx.prompt("intro.md", "prompt");
    fx.sync().unwrap();
    fx.assert_mirrored();
}

#[test]
fn mirror_failure_rolls_back_pass() {
    let mut fx = Fixture::new();
    fx.skill("a.md", "a");
    fx.conn.execute_batch("DROP TABLE content_fts").unwrap();

    let err = fx.sync().unwrap_err();
    assert_matches!(err, SyncError::Reconcile { ref path, .. } if path.ends_with("a.md"));
    assert!(err.to_string().contains("no changes applied"));
    assert_eq!(ContentRepository::count(&fx.conn, ContentKind::Skill).unwrap(), 0);
}

#[test]
fn missing_root_aborts() {
    let mut fx = Fixture::new();
    let config = SyncConfig::new(vec![fx.skills.join("missing")], vec![]);
    let err = sync(&mut fx.conn, &config).unwrap_err();
    assert_matches!(err, SyncError::Scan(_));
}

#[test]
fn kind_without_roots_is_left_alone() {
    let mut fx = Fixture::new();
    fx.skill("a.md", "a");
    fx.prompt("p.md", "p");
    fx.sync().unwrap();

    let config = SyncConfig::new(vec![fx.skills.clone()], vec![]);
    let report = sync(&mut fx.conn, &config).unwrap();
    assert!(report.prompts.deleted.is_empty());
    assert_eq!(ContentRepository::count(&fx.conn, ContentKind::Prompt).unwrap(), 1);
}
