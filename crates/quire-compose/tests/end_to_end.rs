#![allow(unused_results)]

use std::fs;
use std::path::Path;

use assert_matches::assert_matches;
use rusqlite::Connection;
use tempfile::TempDir;

use quire_compose::{ComposeError, render, resolve};
use quire_core::{ContentItem, ContentKind, ReferenceTarget, ReferenceType};
use quire_store::{
    ContentRepository, FragmentCreateParams, FragmentRepository, ReferenceCreateParams,
    ReferenceRepository,
};
use quire_sync::{SyncConfig, sync};

const INTRO: &str = "---\ntitle: Clojure Intro\n---\n# Clojure Intro\n\nImmutable data first.\n";
const REPL: &str = "# The REPL\n\nEvaluate forms as you go.\n";
const HONEYSQL: &str = "# HoneySQL\n\nSQL as Clojure data.\n";
const NEXT_JDBC: &str = "# next.jdbc\n\nLow-level JDBC access.\n";
const PROMPT: &str = "---\ntitle: Fragments and refs\n---\n\n# Clojure database onboarding\n";

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn synced_library() -> (TempDir, Connection) {
    let dir = TempDir::new().unwrap();
    let skills = dir.path().join("skills");
    let prompts = dir.path().join("prompts");
    write(&skills, "clojure/clojure_intro.md", INTRO);
    write(&skills, "clojure/clojure_repl.md", REPL);
    write(&skills, "db/honeysql.md", HONEYSQL);
    write(&skills, "db/next_jdbc.md", NEXT_JDBC);
    write(&prompts, "test_fragments_refs.md", PROMPT);
    write(&prompts, "standalone.md", "# Standalone\n");

    let mut conn = quire_store::open_in_memory().unwrap();
    quire_store::run_migrations(&conn).unwrap();
    sync(&mut conn, &SyncConfig::new(vec![skills], vec![prompts])).unwrap();
    (dir, conn)
}

fn item(conn: &Connection, kind: ContentKind, name: &str) -> ContentItem {
    ContentRepository::find_by_name(conn, kind, name)
        .unwrap()
        .unwrap()
}

fn reference(conn: &Connection, prompt: &str, target: ReferenceTarget, position: i64) {
    ReferenceRepository::create(conn, &ReferenceCreateParams::new(prompt, &target).at(position))
        .unwrap();
}

/// Wires `test_fragments_refs`: two direct skills, then the `db_basics` fragment.
fn compose_fragments_refs(conn: &Connection) -> (String, String) {
    let prompt = item(conn, ContentKind::Prompt, "test_fragments_refs");
    let fragment = FragmentRepository::create(
        conn,
        &FragmentCreateParams {
            name: "db_basics".into(),
            title: Some("Database basics".into()),
            description: None,
        },
    )
    .unwrap();

    // Inserted out of order on purpose; position decides.
    let next_jdbc = item(conn, ContentKind::Skill, "next_jdbc");
    let honeysql = item(conn, ContentKind::Skill, "honeysql");
    FragmentRepository::add_skill(conn, &fragment.id, &next_jdbc.id, 2).unwrap();
    FragmentRepository::add_skill(conn, &fragment.id, &honeysql.id, 1).unwrap();

    let intro = item(conn, ContentKind::Skill, "clojure_intro");
    let repl = item(conn, ContentKind::Skill, "clojure_repl");
    reference(conn, &prompt.id, ReferenceTarget::Fragment(fragment.id.clone()), 3);
    reference(conn, &prompt.id, ReferenceTarget::Skill(repl.id), 2);
    reference(conn, &prompt.id, ReferenceTarget::Skill(intro.id), 1);

    (prompt.id, fragment.id)
}

#[test]
fn fragments_and_refs_resolve_in_order() {
    let (_dir, conn) = synced_library();
    let (prompt_id, _) = compose_fragments_refs(&conn);

    let blocks = resolve(&conn, &prompt_id).unwrap();
    let names: Vec<&str> = blocks.iter().map(|b| b.skill_name.as_str()).collect();
    assert_eq!(names, vec!["clojure_intro", "clojure_repl", "honeysql", "next_jdbc"]);
    assert_eq!(blocks[0].content, INTRO);
}

#[test]
fn fragments_and_refs_render() {
    let (_dir, conn) = synced_library();
    let (prompt_id, _) = compose_fragments_refs(&conn);

    let rendered = render(&conn, &prompt_id).unwrap();
    insta::assert_snapshot!(rendered, @r"
# Clojure database onboarding

---
title: Clojure Intro
---
# Clojure Intro

Immutable data first.

# The REPL

Evaluate forms as you go.

# HoneySQL

SQL as Clojure data.

# next.jdbc

Low-level JDBC access.
");

    let order = ["Clojure database onboarding", "Clojure Intro", "The REPL", "HoneySQL", "next.jdbc"]
        .map(|needle| rendered.find(needle).unwrap());
    assert!(order.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn nested_prompt_expands_its_references() {
    let (_dir, conn) = synced_library();
    let (inner_id, _) = compose_fragments_refs(&conn);
    let outer = item(&conn, ContentKind::Prompt, "standalone");
    let honeysql = item(&conn, ContentKind::Skill, "honeysql");
    reference(&conn, &outer.id, ReferenceTarget::Prompt(inner_id), 1);
    reference(&conn, &outer.id, ReferenceTarget::Skill(honeysql.id), 2);

    let blocks = resolve(&conn, &outer.id).unwrap();
    let names: Vec<&str> = blocks.iter().map(|b| b.skill_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["clojure_intro", "clojure_repl", "honeysql", "next_jdbc", "honeysql"]
    );
}

#[test]
fn prompt_cycle_is_reported() {
    let (_dir, conn) = synced_library();
    let a = item(&conn, ContentKind::Prompt, "test_fragments_refs");
    let b = item(&conn, ContentKind::Prompt, "standalone");
    reference(&conn, &a.id, ReferenceTarget::Prompt(b.id.clone()), 1);
    reference(&conn, &b.id, ReferenceTarget::Prompt(a.id.clone()), 1);

    let err = resolve(&conn, &a.id).unwrap_err();
    assert_matches!(err, ComposeError::Composition { ref cycle } if cycle == &[a.id.clone(), b.id.clone(), a.id.clone()]);
    assert_matches!(render(&conn, &b.id), Err(ComposeError::Composition { .. }));
}

#[test]
fn dangling_fragment_is_a_resolution_error() {
    let (_dir, conn) = synced_library();
    let (prompt_id, fragment_id) = compose_fragments_refs(&conn);
    let other = item(&conn, ContentKind::Prompt, "standalone");
    let repl = item(&conn, ContentKind::Skill, "clojure_repl");
    reference(&conn, &other.id, ReferenceTarget::Skill(repl.id), 1);

    FragmentRepository::delete(&conn, &fragment_id).unwrap();

    let err = resolve(&conn, &prompt_id).unwrap_err();
    assert_matches!(
        err,
        ComposeError::Resolution { target_type: ReferenceType::Fragment, ref id, .. } if id == &fragment_id
    );
    assert!(err.to_string().contains(&fragment_id));

    // Prompts that never touched the fragment are unaffected.
    assert_eq!(resolve(&conn, &other.id).unwrap().len(), 1);
}

#[test]
fn deleted_skill_file_drops_out_of_fragment() {
    let dir = TempDir::new().unwrap();
    let skills = dir.path().join("skills");
    let prompts = dir.path().join("prompts");
    write(&skills, "honeysql.md", HONEYSQL);
    write(&skills, "next_jdbc.md", NEXT_JDBC);
    write(&prompts, "db.md", "# DB\n");
    let config = SyncConfig::new(vec![skills.clone()], vec![prompts]);

    let mut conn = quire_store::open_in_memory().unwrap();
    quire_store::run_migrations(&conn).unwrap();
    sync(&mut conn, &config).unwrap();

    let prompt = item(&conn, ContentKind::Prompt, "db");
    let fragment = FragmentRepository::create(
        &conn,
        &FragmentCreateParams {
            name: "db_basics".into(),
            ..Default::default()
        },
    )
    .unwrap();
    FragmentRepository::add_skill(&conn, &fragment.id, &item(&conn, ContentKind::Skill, "honeysql").id, 1)
        .unwrap();
    FragmentRepository::add_skill(&conn, &fragment.id, &item(&conn, ContentKind::Skill, "next_jdbc").id, 2)
        .unwrap();
    reference(&conn, &prompt.id, ReferenceTarget::Fragment(fragment.id.clone()), 1);

    fs::remove_file(skills.join("honeysql.md")).unwrap();
    sync(&mut conn, &config).unwrap();

    let blocks = resolve(&conn, &prompt.id).unwrap();
    let names: Vec<&str> = blocks.iter().map(|b| b.skill_name.as_str()).collect();
    assert_eq!(names, vec!["next_jdbc"]);
}

#[test]
fn render_missing_prompt() {
    let (_dir, conn) = synced_library();
    assert_matches!(
        render(&conn, "prompt-missing"),
        Err(ComposeError::Resolution { target_type: ReferenceType::Prompt, .. })
    );
    assert_matches!(render(&conn, "two words"), Err(ComposeError::Validation(_)));
}
