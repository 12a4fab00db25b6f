//! # quire-core
//!
//! Shared vocabulary for the quire crates:
//!
//! - **Content model**: [`ContentKind`], [`ContentItem`], [`PromptFragment`],
//!   [`FragmentSkill`], [`PromptReference`] and the exclusive [`ReferenceTarget`]
//! - **Frontmatter**: the never-failing `---` block parser shared by sync and render
//! - **Results**: [`SearchHit`], [`ResolvedBlock`]
//! - **IDs**: prefixed UUID v7 generation and identifier validation
//! - **Errors**: [`ValidationError`], raised before any I/O happens
//! - **Logging**: [`logging::init_subscriber`] for binaries

#![deny(unsafe_code)]

pub mod constants;
pub mod errors;
pub mod frontmatter;
pub mod ids;
pub mod logging;
pub mod types;

pub use errors::ValidationError;
pub use frontmatter::{Frontmatter, parse_document, strip_frontmatter};
pub use types::*;
