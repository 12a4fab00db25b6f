//! Reference graph resolution.
//!
//! Expansion is depth-first. The ids of the prompts currently being expanded
//! are carried down as an explicit path: meeting one of them again is a
//! cycle, and the path doubles as the chain reported for missing targets.
//! The same skill reached through different branches is emitted each time.

use rusqlite::Connection;
use tracing::debug;

use quire_core::ids::validate_id;
use quire_core::{ReferenceTarget, ReferenceType, ResolvedBlock};

use crate::errors::{ComposeError, Result};
use crate::source::{CompositionSource, SqliteSource};

/// Resolve a prompt into its ordered skill blocks.
pub fn resolve(conn: &Connection, prompt_id: &str) -> Result<Vec<ResolvedBlock>> {
    resolve_with(&SqliteSource::new(conn), prompt_id)
}

/// Resolve a prompt against any [`CompositionSource`].
///
/// All-or-nothing: an error never comes with a partial list.
pub fn resolve_with<S: CompositionSource + ?Sized>(
    source: &S,
    prompt_id: &str,
) -> Result<Vec<ResolvedBlock>> {
    validate_id("prompt", prompt_id)?;
    let mut path = Vec::new();
    let mut blocks = Vec::new();
    expand(source, prompt_id, &mut path, &mut blocks)?;
    debug!(prompt_id, blocks = blocks.len(), "resolved prompt");
    Ok(blocks)
}

fn expand<S: CompositionSource + ?Sized>(
    source: &S,
    prompt_id: &str,
    path: &mut Vec<String>,
    out: &mut Vec<ResolvedBlock>,
) -> Result<()> {
    if path.iter().any(|p| p == prompt_id) {
        let mut cycle = path.clone();
        cycle.push(prompt_id.to_string());
        return Err(ComposeError::Composition { cycle });
    }
    if !source.prompt_exists(prompt_id)? {
        return Err(missing(ReferenceType::Prompt, prompt_id, path));
    }

    path.push(prompt_id.to_string());
    for reference in source.references(prompt_id)? {
        debug!(
            prompt_id,
            reference_id = %reference.id,
            reference_type = %reference.target.reference_type(),
            target = %reference.target.id(),
            "expanding reference"
        );
        match &reference.target {
            ReferenceTarget::Skill(skill_id) => out.push(skill_block(source, skill_id, path)?),
            ReferenceTarget::Fragment(fragment_id) => {
                let members = source
                    .fragment_skills(fragment_id)?
                    .ok_or_else(|| missing(ReferenceType::Fragment, fragment_id, path))?;
                for skill_id in &members {
                    out.push(skill_block(source, skill_id, path)?);
                }
            }
            ReferenceTarget::Prompt(target_id) => expand(source, target_id, path, out)?,
        }
    }
    let _ = path.pop();
    Ok(())
}

fn skill_block<S: CompositionSource + ?Sized>(
    source: &S,
    skill_id: &str,
    path: &[String],
) -> Result<ResolvedBlock> {
    let skill = source
        .skill(skill_id)?
        .ok_or_else(|| missing(ReferenceType::Skill, skill_id, path))?;
    Ok(ResolvedBlock {
        source_skill_id: skill.id,
        skill_name: skill.name,
        content: skill.content,
    })
}

fn missing(target_type: ReferenceType, id: &str, path: &[String]) -> ComposeError {
    ComposeError::Resolution {
        target_type,
        id: id.to_string(),
        chain: path.to_vec(),
    }
}
