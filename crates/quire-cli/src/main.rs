//! # quire
//!
//! Command-line entry point: loads settings, installs logging, opens the
//! database and dispatches to a command handler.

#![deny(unsafe_code)]

mod cli;
mod commands;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use quire_settings::{QuireSettings, load_settings, load_settings_from_path};
use quire_store::ConnectionConfig;

use crate::cli::Cli;

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

fn load(cli: &Cli) -> Result<QuireSettings> {
    let settings = match &cli.config {
        Some(path) => load_settings_from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => load_settings().context("Failed to load settings")?,
    };
    Ok(settings)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load(&cli)?;
    quire_core::logging::init_subscriber(&settings.logging.level);

    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.db_path));
    ensure_parent_dir(&db_path)?;
    debug!(db = %db_path.display(), "opening database");

    let mut conn = quire_store::open_file(&db_path, &ConnectionConfig::default())
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    quire_store::run_migrations(&conn).context("Failed to run migrations")?;

    commands::run(cli.command, &mut conn, &settings)
}
