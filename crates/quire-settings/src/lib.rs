//! # quire-settings
//!
//! Configuration management with layered sources.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`QuireSettings::default()`]
//! 2. **User file**: `$QUIRE_HOME/settings.json`, else `~/.quire/settings.json`
//!    (deep-merged over defaults)
//! 3. **Environment variables**: `QUIRE_*` overrides (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use quire_settings::load_settings;
//!
//! let settings = load_settings().unwrap_or_default();
//! println!("database: {}", settings.db_path);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, quire_home, settings_path};
pub use types::*;
