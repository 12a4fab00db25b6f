//! Command handlers. Structured results print as pretty JSON on stdout.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;

use quire_core::{ContentItem, ContentKind, PromptFragment, ReferenceTarget, ReferenceType};
use quire_settings::QuireSettings;
use quire_store::{
    ContentRepository, FragmentCreateParams, FragmentRepository, ReferenceCreateParams,
    ReferenceRepository, SearchIndex, SearchOptions,
};
use quire_sync::{ScanOptions, SyncConfig};

use crate::cli::{Command, FragmentCommand, ReferenceCommand};

/// Dispatch one command.
pub fn run(command: Command, conn: &mut Connection, settings: &QuireSettings) -> Result<()> {
    match command {
        Command::Sync => {
            let report = quire_sync::sync(conn, &sync_config(settings)).context("Sync failed")?;
            print_json(&report)
        }
        Command::Search { query, scope, limit } => {
            let opts = SearchOptions {
                scope: scope.map(Into::into),
                limit,
            };
            print_json(&SearchIndex::search(conn, &query, &opts)?)
        }
        Command::Resolve { prompt } => {
            let prompt = find_content(conn, ContentKind::Prompt, &prompt)?;
            print_json(&quire_compose::resolve(conn, &prompt.id)?)
        }
        Command::Render { prompt, output } => {
            let prompt = find_content(conn, ContentKind::Prompt, &prompt)?;
            let markdown = quire_compose::render(conn, &prompt.id)?;
            match output {
                Some(path) => std::fs::write(&path, markdown)
                    .with_context(|| format!("Failed to write {}", path.display())),
                None => {
                    print!("{markdown}");
                    Ok(())
                }
            }
        }
        Command::Fragment(cmd) => run_fragment(cmd, conn),
        Command::Reference(cmd) => run_reference(cmd, conn),
        Command::Stats => print_json(&quire_store::stats(conn)?),
    }
}

/// Build the sync inputs from settings. Relative directories resolve
/// against the working directory.
pub fn sync_config(settings: &QuireSettings) -> SyncConfig {
    let to_paths = |dirs: &[String]| dirs.iter().map(PathBuf::from).collect();
    SyncConfig {
        skill_roots: to_paths(&settings.skills_dirs),
        prompt_roots: to_paths(&settings.prompts_dirs),
        scan: ScanOptions {
            extension: settings.file_extension.clone(),
            max_file_bytes: settings.max_file_bytes,
        },
    }
}

fn run_fragment(cmd: FragmentCommand, conn: &Connection) -> Result<()> {
    match cmd {
        FragmentCommand::Create {
            name,
            title,
            description,
        } => {
            let fragment = FragmentRepository::create(
                conn,
                &FragmentCreateParams {
                    name,
                    title,
                    description,
                },
            )?;
            print_json(&fragment)
        }
        FragmentCommand::Delete { fragment } => {
            let fragment = find_fragment(conn, &fragment)?;
            let deleted = FragmentRepository::delete(conn, &fragment.id)?;
            print_json(&json!({ "id": fragment.id, "deleted": deleted }))
        }
        FragmentCommand::List => {
            let mut listing = Vec::new();
            for fragment in FragmentRepository::list(conn)? {
                let skills = FragmentRepository::skills(conn, &fragment.id)?;
                listing.push(json!({ "fragment": fragment, "skills": skills }));
            }
            print_json(&listing)
        }
        FragmentCommand::AddSkill {
            fragment,
            skill,
            position,
        } => {
            let fragment = find_fragment(conn, &fragment)?;
            let skill = find_content(conn, ContentKind::Skill, &skill)?;
            let position = match position {
                Some(p) => p,
                None => FragmentRepository::skills(conn, &fragment.id)?
                    .last()
                    .map_or(1, |m| m.position + 1),
            };
            print_json(&FragmentRepository::add_skill(
                conn,
                &fragment.id,
                &skill.id,
                position,
            )?)
        }
        FragmentCommand::RemoveSkill { fragment, skill } => {
            let fragment = find_fragment(conn, &fragment)?;
            let skill = find_content(conn, ContentKind::Skill, &skill)?;
            let removed = FragmentRepository::remove_skill(conn, &fragment.id, &skill.id)?;
            print_json(&json!({ "fragmentId": fragment.id, "skillId": skill.id, "removed": removed }))
        }
    }
}

fn run_reference(cmd: ReferenceCommand, conn: &Connection) -> Result<()> {
    match cmd {
        ReferenceCommand::Add {
            prompt,
            target_type,
            target,
            position,
        } => {
            let prompt = find_content(conn, ContentKind::Prompt, &prompt)?;
            let target = match ReferenceType::from(target_type) {
                ReferenceType::Skill => {
                    ReferenceTarget::Skill(find_content(conn, ContentKind::Skill, &target)?.id)
                }
                ReferenceType::Fragment => ReferenceTarget::Fragment(find_fragment(conn, &target)?.id),
                ReferenceType::Prompt => {
                    ReferenceTarget::Prompt(find_content(conn, ContentKind::Prompt, &target)?.id)
                }
            };
            let mut params = ReferenceCreateParams::new(prompt.id, &target);
            params.position = position;
            print_json(&ReferenceRepository::create(conn, &params)?)
        }
        ReferenceCommand::Remove { id } => {
            let deleted = ReferenceRepository::delete(conn, &id)?;
            if !deleted {
                bail!("Reference not found: {id}");
            }
            print_json(&json!({ "id": id, "deleted": true }))
        }
        ReferenceCommand::List { prompt } => {
            let prompt = find_content(conn, ContentKind::Prompt, &prompt)?;
            print_json(&ReferenceRepository::list_for_prompt(conn, &prompt.id)?)
        }
    }
}

// ── Lookup by name or id ────────────────────────────────────────────────────

fn find_content(conn: &Connection, kind: ContentKind, id_or_name: &str) -> Result<ContentItem> {
    match ContentRepository::find(conn, kind, id_or_name)? {
        Some(item) => Ok(item),
        None => bail!("{kind} not found: {id_or_name}"),
    }
}

fn find_fragment(conn: &Connection, id_or_name: &str) -> Result<PromptFragment> {
    match FragmentRepository::find(conn, id_or_name)? {
        Some(fragment) => Ok(fragment),
        None => bail!("fragment not found: {id_or_name}"),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
