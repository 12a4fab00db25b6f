//! Core types for the content index.
//!
//! All serializable types use `camelCase` so JSON output from the CLI reads
//! the same as the settings file.

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::ids::{PROMPT_PREFIX, SKILL_PREFIX};

// ─────────────────────────────────────────────────────────────────────────────
// Content
// ─────────────────────────────────────────────────────────────────────────────

/// The two kinds of file-backed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Atomic documentation fragment.
    Skill,
    /// Composite document built from skills, fragments and other prompts.
    Prompt,
}

impl ContentKind {
    /// Both kinds, in sync order.
    pub const ALL: [Self; 2] = [Self::Skill, Self::Prompt];

    /// SQL string representation (matches the `content_fts.kind` values).
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Skill => "skill",
            Self::Prompt => "prompt",
        }
    }

    /// Primary table holding rows of this kind.
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Self::Skill => "skills",
            Self::Prompt => "prompts",
        }
    }

    /// Prefix used for generated ids of this kind.
    #[must_use]
    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::Skill => SKILL_PREFIX,
            Self::Prompt => PROMPT_PREFIX,
        }
    }

    /// Parse the SQL representation.
    #[must_use]
    pub fn from_sql(s: &str) -> Option<Self> {
        match s {
            "skill" => Some(Self::Skill),
            "prompt" => Some(Self::Prompt),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A skill or prompt row mirrored from a file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    /// Stable row id, assigned on first insert.
    pub id: String,
    /// Skill or prompt.
    pub kind: ContentKind,
    /// Source file path; the reconciliation identity.
    pub path: String,
    /// Directory of the file relative to its scan root (`/`-joined).
    pub category: String,
    /// File stem, unique within its kind.
    pub name: String,
    /// Title from frontmatter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description from frontmatter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Raw file content, frontmatter included.
    pub content: String,
    /// SHA-256 hex digest of `content`.
    pub file_hash: String,
    /// Content length in bytes.
    pub size_bytes: i64,
    /// Approximate token count (`size_bytes / 4`).
    pub token_count: i64,
    /// ISO 8601 creation time; immutable.
    pub created_at: String,
    /// ISO 8601 time of the last content change.
    pub updated_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Composition
// ─────────────────────────────────────────────────────────────────────────────

/// A named, reusable, ordered grouping of skills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFragment {
    /// Fragment id (`frag-…`).
    pub id: String,
    /// Unique fragment name.
    pub name: String,
    /// Optional display title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO 8601 creation time.
    pub created_at: String,
    /// ISO 8601 last modification time.
    pub updated_at: String,
}

/// Membership of one skill in a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentSkill {
    /// Owning fragment.
    pub fragment_id: String,
    /// Member skill.
    pub skill_id: String,
    /// Render order within the fragment (ties broken by `skill_id`).
    pub position: i64,
}

/// What kind of row a prompt reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    /// Direct embed of one skill.
    Skill,
    /// Embed of every skill in a fragment.
    Fragment,
    /// Transitive embed of another prompt's resolved references.
    Prompt,
}

impl ReferenceType {
    /// SQL string representation (matches `SQLite` CHECK constraint values).
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Skill => "skill",
            Self::Fragment => "fragment",
            Self::Prompt => "prompt",
        }
    }

    /// Parse the SQL representation.
    #[must_use]
    pub fn from_sql(s: &str) -> Option<Self> {
        match s {
            "skill" => Some(Self::Skill),
            "fragment" => Some(Self::Fragment),
            "prompt" => Some(Self::Prompt),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// The single target of a prompt reference.
///
/// Exactly one target exists per reference, and its variant is the
/// reference type, so a mismatched or doubly-set target cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "referenceType", content = "targetId", rename_all = "lowercase")]
pub enum ReferenceTarget {
    /// Target skill id.
    Skill(String),
    /// Target fragment id.
    Fragment(String),
    /// Target prompt id.
    Prompt(String),
}

impl ReferenceTarget {
    /// Reference type implied by the variant.
    #[must_use]
    pub fn reference_type(&self) -> ReferenceType {
        match self {
            Self::Skill(_) => ReferenceType::Skill,
            Self::Fragment(_) => ReferenceType::Fragment,
            Self::Prompt(_) => ReferenceType::Prompt,
        }
    }

    /// Target id regardless of type.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Skill(id) | Self::Fragment(id) | Self::Prompt(id) => id,
        }
    }

    /// Build a target from the column layout of `prompt_references`.
    ///
    /// Exactly one of the three target columns must be set, and it must be
    /// the one named by `reference_type`.
    pub fn from_columns(
        reference_type: &str,
        skill_id: Option<String>,
        fragment_id: Option<String>,
        prompt_id: Option<String>,
    ) -> Result<Self, ValidationError> {
        let ty = ReferenceType::from_sql(reference_type).ok_or_else(|| {
            ValidationError::new(format!("unknown reference type: {reference_type}"))
        })?;
        let set = [&skill_id, &fragment_id, &prompt_id]
            .iter()
            .filter(|c| c.is_some())
            .count();
        if set != 1 {
            return Err(ValidationError::new(format!(
                "reference must set exactly one target, found {set}"
            )));
        }
        match (ty, skill_id, fragment_id, prompt_id) {
            (ReferenceType::Skill, Some(id), None, None) => Ok(Self::Skill(id)),
            (ReferenceType::Fragment, None, Some(id), None) => Ok(Self::Fragment(id)),
            (ReferenceType::Prompt, None, None, Some(id)) => Ok(Self::Prompt(id)),
            (ty, ..) => Err(ValidationError::new(format!(
                "reference type {ty} does not match its target column"
            ))),
        }
    }

    /// Split into the `(skill, fragment, prompt)` column layout.
    #[must_use]
    pub fn to_columns(&self) -> (Option<&str>, Option<&str>, Option<&str>) {
        match self {
            Self::Skill(id) => (Some(id), None, None),
            Self::Fragment(id) => (None, Some(id), None),
            Self::Prompt(id) => (None, None, Some(id)),
        }
    }
}

/// An ordered edge from a prompt to a skill, fragment, or prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptReference {
    /// Reference id (`ref-…`).
    pub id: String,
    /// Prompt that owns this reference.
    pub source_prompt_id: String,
    /// What the reference expands to.
    #[serde(flatten)]
    pub target: ReferenceTarget,
    /// Expansion order within the source prompt.
    pub position: i64,
    /// ISO 8601 creation time.
    pub created_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Query results
// ─────────────────────────────────────────────────────────────────────────────

/// One ranked full-text search match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Kind of the matched item.
    pub kind: ContentKind,
    /// Row id of the matched item.
    pub id: String,
    /// Source path.
    pub path: String,
    /// Item name.
    pub name: String,
    /// Item title, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Item category.
    pub category: String,
    /// Highlighted excerpt of the body.
    pub snippet: String,
    /// Relevance; higher is better.
    pub score: f64,
}

/// One skill's content in a resolved prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedBlock {
    /// Skill the content came from.
    pub source_skill_id: String,
    /// Name of that skill.
    pub skill_name: String,
    /// Raw skill content, frontmatter included.
    pub content: String,
}
