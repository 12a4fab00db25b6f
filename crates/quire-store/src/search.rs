//! Search index: FTS5 full-text search over skills and prompts.
//!
//! `content_fts` is written explicitly by the reconcile pass (see
//! [`SearchIndex::index`] and [`SearchIndex::deindex`]). User queries never
//! reach FTS5 verbatim: [`compile_query`] turns them into an expression in
//! which every term is quoted, so punctuation such as `next.jdbc` cannot
//! produce FTS5 syntax errors.

use rusqlite::{Connection, params};
use tracing::debug;

use quire_core::constants::{DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT};
use quire_core::{ContentItem, ContentKind, SearchHit, ValidationError};

use crate::errors::Result;

/// Options for search queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    /// Restrict results to one kind.
    pub scope: Option<ContentKind>,
    /// Maximum results (default 50, at most 1000).
    pub limit: Option<i64>,
}

/// Search index, stateless, every method takes `&Connection`.
pub struct SearchIndex;

impl SearchIndex {
    /// Write (or rewrite) the index row for an item.
    pub fn index(conn: &Connection, item: &ContentItem) -> Result<()> {
        let _ = Self::deindex(conn, item.kind, &item.path)?;
        let _ = conn.execute(
            "INSERT INTO content_fts (path, kind, name, title, description, content)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                item.path,
                item.kind.as_sql(),
                item.name,
                item.title,
                item.description,
                item.content,
            ],
        )?;
        Ok(())
    }

    /// Remove the index row for a path. Returns whether one existed.
    pub fn deindex(conn: &Connection, kind: ContentKind, path: &str) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM content_fts WHERE path = ?1 AND kind = ?2",
            params![path, kind.as_sql()],
        )?;
        Ok(changed > 0)
    }

    /// Full-text search with weighted BM25 ranking.
    ///
    /// The query and limit are validated before the database is touched.
    /// Hits are ordered by score (higher is better), then path.
    pub fn search(conn: &Connection, query: &str, opts: &SearchOptions) -> Result<Vec<SearchHit>> {
        use std::fmt::Write;
        let limit = validate_limit(opts.limit)?;
        let expression = compile_query(query)?;
        debug!(query, %expression, limit, scope = ?opts.scope, "searching");

        let mut sql = String::from(
            "SELECT
               content_fts.kind,
               content_fts.path,
               COALESCE(s.id, p.id) AS id,
               COALESCE(s.name, p.name) AS name,
               COALESCE(s.title, p.title) AS title,
               COALESCE(s.category, p.category) AS category,
               snippet(content_fts, 5, '<mark>', '</mark>', '...', 32) AS snippet,
               bm25(content_fts, 0.0, 0.0, 10.0, 8.0, 4.0, 1.0) AS score_raw
             FROM content_fts
             LEFT JOIN skills s ON content_fts.kind = 'skill' AND s.path = content_fts.path
             LEFT JOIN prompts p ON content_fts.kind = 'prompt' AND p.path = content_fts.path
             WHERE content_fts MATCH ?1
               AND COALESCE(s.id, p.id) IS NOT NULL",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(expression)];
        if let Some(kind) = opts.scope {
            sql.push_str(" AND content_fts.kind = ?2");
            param_values.push(Box::new(kind.as_sql()));
        }
        sql.push_str(" ORDER BY score_raw, content_fts.path");
        let _ = write!(sql, " LIMIT {limit}");

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(Box::as_ref).collect();
        let hits = stmt
            .query_map(params_refs.as_slice(), map_search_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(hits)
    }

    /// Indexed paths of one kind, ordered.
    pub fn indexed_paths(conn: &Connection, kind: ContentKind) -> Result<Vec<String>> {
        let mut stmt = conn.prepare("SELECT path FROM content_fts WHERE kind = ?1 ORDER BY path")?;
        let paths = stmt
            .query_map(params![kind.as_sql()], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(paths)
    }

    /// Number of indexed rows.
    pub fn count(conn: &Connection) -> Result<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM content_fts", [], |row| row.get(0))?)
    }
}

fn map_search_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SearchHit> {
    let kind: String = row.get("kind")?;
    let kind = ContentKind::from_sql(&kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unknown content kind: {kind}").into(),
        )
    })?;
    let score_raw: f64 = row.get("score_raw")?;
    Ok(SearchHit {
        kind,
        id: row.get("id")?,
        path: row.get("path")?,
        name: row.get("name")?,
        title: row.get("title")?,
        category: row.get("category")?,
        snippet: row.get("snippet")?,
        score: -score_raw,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

/// Resolve the effective limit, rejecting values outside `1..=1000`.
pub fn validate_limit(limit: Option<i64>) -> std::result::Result<i64, ValidationError> {
    let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    if (1..=MAX_SEARCH_LIMIT).contains(&limit) {
        Ok(limit)
    } else {
        Err(ValidationError::new(format!(
            "limit must be between 1 and {MAX_SEARCH_LIMIT}, got {limit}"
        )))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Query compilation
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum Token {
    Term { text: String, prefix: bool, negated: bool },
    Or,
}

/// Compile user query syntax into a safe FTS5 expression.
///
/// Accepted syntax: bare terms (implicit AND), `"quoted phrases"`, `OR`,
/// `-term`, `-"phrase"` and `NOT term` for negation, `AND` (no-op), and a
/// trailing `*` for prefix terms. Parentheses are ignored. Negated terms
/// exclude matches from the whole query, not only from the nearest `OR`
/// branch.
pub fn compile_query(query: &str) -> std::result::Result<String, ValidationError> {
    if query.trim().is_empty() {
        return Err(ValidationError::new("search query must not be empty"));
    }

    let mut groups: Vec<Vec<String>> = vec![Vec::new()];
    let mut negations: Vec<String> = Vec::new();
    for token in tokenize(query) {
        match token {
            Token::Or => {
                if groups.last().is_some_and(|g| !g.is_empty()) {
                    groups.push(Vec::new());
                }
            }
            Token::Term { text, prefix, negated } => {
                let quoted = quote_term(&text, prefix);
                if negated {
                    negations.push(quoted);
                } else if let Some(group) = groups.last_mut() {
                    group.push(quoted);
                }
            }
        }
    }
    groups.retain(|g| !g.is_empty());

    if groups.is_empty() {
        return Err(ValidationError::new(if negations.is_empty() {
            "search query has no searchable terms"
        } else {
            "search query must contain at least one non-negated term"
        }));
    }

    let positive = groups
        .iter()
        .map(|g| format!("({})", g.join(" AND ")))
        .collect::<Vec<_>>()
        .join(" OR ");
    if negations.is_empty() {
        Ok(positive)
    } else {
        Ok(format!("({positive}) NOT ({})", negations.join(" OR ")))
    }
}

fn quote_term(text: &str, prefix: bool) -> String {
    let escaped = text.replace('"', "\"\"");
    if prefix {
        format!("\"{escaped}\"*")
    } else {
        format!("\"{escaped}\"")
    }
}

fn tokenize(query: &str) -> Vec<Token> {
    let chars: Vec<char> = query.chars().collect();
    let mut tokens = Vec::new();
    let mut negate_next = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() || c == '(' || c == ')' {
            i += 1;
            continue;
        }

        let mut negated = std::mem::take(&mut negate_next);
        if c == '-' && chars.get(i + 1).is_some_and(|n| !n.is_whitespace()) {
            negated = true;
            i += 1;
        }

        if chars[i] == '"' {
            let start = i + 1;
            let mut end = start;
            while end < chars.len() && chars[end] != '"' {
                end += 1;
            }
            let text: String = chars[start..end].iter().collect();
            i = end + 1;
            let prefix = chars.get(i) == Some(&'*');
            if prefix {
                i += 1;
            }
            push_term(&mut tokens, text, prefix, negated);
            continue;
        }

        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '(' && chars[i] != ')' {
            i += 1;
        }
        let word: String = chars[start..i].iter().collect();

        if !negated {
            match word.as_str() {
                "OR" => {
                    tokens.push(Token::Or);
                    continue;
                }
                "AND" => continue,
                "NOT" => {
                    negate_next = true;
                    continue;
                }
                _ => {}
            }
        }

        let trimmed = word.trim_end_matches('*');
        let prefix = trimmed.len() < word.len();
        push_term(&mut tokens, trimmed.to_string(), prefix, negated);
    }
    tokens
}

fn push_term(tokens: &mut Vec<Token>, text: String, prefix: bool, negated: bool) {
    // Terms with nothing for the tokenizer to index would match nothing.
    if text.chars().any(char::is_alphanumeric) {
        tokens.push(Token::Term { text, prefix, negated });
    }
}
