//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use quire_core::{ContentKind, ReferenceType};

/// Index, search and compose markdown skills and prompts.
#[derive(Parser, Debug)]
#[command(name = "quire", version, about)]
pub struct Cli {
    /// Path to the `SQLite` database (overrides settings).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to the settings file (default `$QUIRE_HOME/settings.json`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reconcile the index with the skill and prompt directories.
    Sync,

    /// Full-text search over skills and prompts.
    Search {
        /// Query: terms, "phrases", OR, -term / NOT term, prefix*.
        query: String,
        /// Restrict to one kind.
        #[arg(long, value_enum)]
        scope: Option<Scope>,
        /// Maximum results (1-1000, default 50).
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Print a prompt's resolved skill blocks as JSON.
    Resolve {
        /// Prompt name or id.
        prompt: String,
    },

    /// Render a prompt to markdown.
    Render {
        /// Prompt name or id.
        prompt: String,
        /// Write to a file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Manage fragments.
    #[command(subcommand)]
    Fragment(FragmentCommand),

    /// Manage prompt references.
    #[command(subcommand)]
    Reference(ReferenceCommand),

    /// Row counts.
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum FragmentCommand {
    /// Create a fragment.
    Create {
        /// Unique name.
        name: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a fragment. References to it are left dangling.
    Delete {
        /// Fragment name or id.
        fragment: String,
    },
    /// List fragments with their skills.
    List,
    /// Add a skill to a fragment, or move it.
    AddSkill {
        /// Fragment name or id.
        fragment: String,
        /// Skill name or id.
        skill: String,
        /// Position (default: after the last member).
        #[arg(long)]
        position: Option<i64>,
    },
    /// Remove a skill from a fragment.
    RemoveSkill {
        /// Fragment name or id.
        fragment: String,
        /// Skill name or id.
        skill: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReferenceCommand {
    /// Add a reference from a prompt to a skill, fragment or prompt.
    Add {
        /// Source prompt name or id.
        prompt: String,
        /// Target type.
        #[arg(value_enum)]
        target_type: TargetType,
        /// Target name or id.
        target: String,
        /// Position (default: after the last reference).
        #[arg(long)]
        position: Option<i64>,
    },
    /// Remove a reference by id.
    Remove {
        /// Reference id.
        id: String,
    },
    /// List a prompt's references in expansion order.
    List {
        /// Prompt name or id.
        prompt: String,
    },
}

/// Search scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scope {
    Skill,
    Prompt,
}

impl From<Scope> for ContentKind {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Skill => Self::Skill,
            Scope::Prompt => Self::Prompt,
        }
    }
}

/// Reference target type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TargetType {
    Skill,
    Fragment,
    Prompt,
}

impl From<TargetType> for ReferenceType {
    fn from(t: TargetType) -> Self {
        match t {
            TargetType::Skill => Self::Skill,
            TargetType::Fragment => Self::Fragment,
            TargetType::Prompt => Self::Prompt,
        }
    }
}
