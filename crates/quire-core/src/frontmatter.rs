//! Markdown frontmatter parsing.
//!
//! Files may start with a YAML block delimited by `---` lines. Only the
//! `name`, `title` and `description` keys are read, with a hand-written YAML
//! subset parser (no external YAML dependency) that accepts plain and quoted
//! scalars plus `|` / `>` block scalars. Parsing never fails: anything it
//! cannot make sense of yields `None` for that field.

/// Fields read from a frontmatter block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    /// `name:` value.
    pub name: Option<String>,
    /// `title:` value.
    pub title: Option<String>,
    /// `description:` value.
    pub description: Option<String>,
}

impl Frontmatter {
    /// Display title: `title`, else `name`.
    #[must_use]
    pub fn display_title(&self) -> Option<String> {
        self.title.clone().or_else(|| self.name.clone())
    }
}

/// A markdown document split into frontmatter and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument<'a> {
    /// Parsed frontmatter (all `None` if there was no block).
    pub frontmatter: Frontmatter,
    /// Content after the closing delimiter, or the whole input.
    pub body: &'a str,
}

/// Split and parse a document.
#[must_use]
pub fn parse_document(raw: &str) -> ParsedDocument<'_> {
    let (yaml, body) = split_frontmatter(raw);
    ParsedDocument {
        frontmatter: yaml.map(parse_frontmatter).unwrap_or_default(),
        body,
    }
}

/// The document body with any frontmatter block removed.
#[must_use]
pub fn strip_frontmatter(raw: &str) -> &str {
    split_frontmatter(raw).1
}

/// Split off a leading `---` block.
///
/// The opening delimiter must be the first line (a UTF-8 BOM is tolerated)
/// and the block must be closed by a line that is exactly `---`. Otherwise
/// the whole input is body.
#[must_use]
pub fn split_frontmatter(raw: &str) -> (Option<&str>, &str) {
    let start = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let Some(rest) = start.strip_prefix("---") else {
        return (None, raw);
    };
    let Some(rest) = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) else {
        return (None, raw);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, raw)
}

/// Parse the YAML subset of a frontmatter block.
///
/// Supports:
/// - Simple key-value pairs: `title: value`
/// - Quoted strings: `title: "My Skill"`, `title: 'It''s'`
/// - Literal and folded block scalars: `description: |` / `description: >-`
/// - Comments and nested keys (ignored)
#[must_use]
pub fn parse_frontmatter(yaml: &str) -> Frontmatter {
    let mut fm = Frontmatter::default();
    let lines: Vec<&str> = yaml.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        i += 1;

        // Nested mappings and list items belong to some other key.
        if line.starts_with(char::is_whitespace) {
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };

        let value = value.trim();
        let value = if is_block_indicator(value) {
            parse_block_scalar(value, &lines, &mut i)
        } else {
            unquote(value)
        };
        let value = non_empty(&value);

        match key.trim() {
            "name" => fm.name = value,
            "title" => fm.title = value,
            "description" => fm.description = value,
            _ => {}
        }
    }

    fm
}

fn is_block_indicator(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some('|' | '>'))
        && chars.all(|c| c == '-' || c == '+' || c.is_ascii_digit())
}

/// Collect the indented lines following a `|` or `>` indicator.
fn parse_block_scalar(indicator: &str, lines: &[&str], i: &mut usize) -> String {
    let mut block = Vec::new();
    while *i < lines.len() {
        let line = lines[*i];
        if !line.trim().is_empty() && !line.starts_with(char::is_whitespace) {
            break;
        }
        block.push(line);
        *i += 1;
    }
    while block.last().is_some_and(|l| l.trim().is_empty()) {
        let _ = block.pop();
    }

    let indent = block
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    let dedented: Vec<&str> = block
        .iter()
        .map(|l| l.get(indent..).unwrap_or_else(|| l.trim_start()))
        .collect();

    if indicator.starts_with('|') {
        return dedented.join("\n");
    }

    // Folded: single newlines become spaces, blank lines become newlines.
    let mut out = String::new();
    let mut at_break = true;
    for line in dedented {
        if line.trim().is_empty() {
            out.push('\n');
            at_break = true;
        } else {
            if !at_break {
                out.push(' ');
            }
            out.push_str(line.trim_end());
            at_break = false;
        }
    }
    out
}

/// Remove surrounding quotes, or a trailing comment from a plain scalar.
fn unquote(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        return trimmed[1..trimmed.len() - 1].replace("\\\"", "\"");
    }
    if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        return trimmed[1..trimmed.len() - 1].replace("''", "'");
    }
    match trimmed.find(" #") {
        Some(idx) => trimmed[..idx].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == "~" || value == "null" {
        None
    } else {
        Some(value.to_string())
    }
}
