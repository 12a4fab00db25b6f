//! Markdown rendering of a resolved prompt.

use rusqlite::Connection;

use quire_core::ids::validate_id;
use quire_core::{ContentKind, ReferenceType, ResolvedBlock, strip_frontmatter};
use quire_store::ContentRepository;

use crate::errors::{ComposeError, Result};
use crate::resolver::resolve;

/// Render a prompt: its body followed by every resolved skill.
pub fn render(conn: &Connection, prompt_id: &str) -> Result<String> {
    validate_id("prompt", prompt_id)?;
    let prompt = ContentRepository::get(conn, ContentKind::Prompt, prompt_id)?.ok_or_else(|| {
        ComposeError::Resolution {
            target_type: ReferenceType::Prompt,
            id: prompt_id.to_string(),
            chain: Vec::new(),
        }
    })?;
    let blocks = resolve(conn, prompt_id)?;
    Ok(render_blocks(strip_frontmatter(&prompt.content), &blocks))
}

/// Join a prompt body and skill blocks into one document.
///
/// Blocks are copied as they are apart from trailing blank lines; the body
/// also loses its leading line breaks. Blank parts are dropped, parts are
/// separated by one blank line, and the result ends with a single newline
/// (or is empty when nothing is left).
pub fn render_blocks(body: &str, blocks: &[ResolvedBlock]) -> String {
    let parts: Vec<&str> = std::iter::once(body.trim_start_matches(['\n', '\r']))
        .chain(blocks.iter().map(|b| b.content.as_str()))
        .map(trim_trailing_blank_lines)
        .filter(|part| !part.trim().is_empty())
        .collect();

    if parts.is_empty() {
        return String::new();
    }
    let mut out = parts.join("\n\n");
    out.push('\n');
    out
}

/// Drop line breaks and whitespace-only lines from the end of `part`.
fn trim_trailing_blank_lines(part: &str) -> &str {
    let mut end = part.trim_end_matches(['\n', '\r']);
    while let Some((head, last)) = end.rsplit_once('\n') {
        if !last.trim().is_empty() {
            break;
        }
        end = head.trim_end_matches(['\n', '\r']);
    }
    end
}
