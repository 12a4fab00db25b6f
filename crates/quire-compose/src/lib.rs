//! # quire-compose
//!
//! Prompt composition over the quire store.
//!
//! - [`resolve`] expands a prompt's references (skills, fragments and other
//!   prompts) into an ordered list of [`quire_core::ResolvedBlock`]s,
//!   rejecting cycles and missing targets.
//! - [`render`] turns a prompt and its blocks into one markdown document.
//!
//! Reads go through [`CompositionSource`]; [`SqliteSource`] is the store
//! implementation.

#![deny(unsafe_code)]

pub mod errors;
pub mod renderer;
pub mod resolver;
pub mod source;

pub use errors::{ComposeError, Result};
pub use renderer::{render, render_blocks};
pub use resolver::{resolve, resolve_with};
pub use source::{CompositionSource, SqliteSource};
