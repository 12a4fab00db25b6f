//! `SQLite` connections with WAL mode and foreign keys enabled.
//!
//! quire is a single-process batch tool, so it works with one plain
//! [`Connection`] per invocation. [`configure`] runs on every connection
//! this module opens; foreign keys must be on for the cascade rules the
//! schema relies on.

use std::path::Path;

use rusqlite::Connection;

use crate::errors::Result;

/// Per-connection tuning.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Busy timeout in milliseconds (default: 30000).
    pub busy_timeout_ms: u32,
    /// Cache size in KiB (default: 8192 = 8 MB).
    pub cache_size_kib: i64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 30_000,
            cache_size_kib: 8192,
        }
    }
}

/// Apply pragmas to a freshly opened connection.
pub fn configure(conn: &Connection, config: &ConnectionConfig) -> Result<()> {
    conn.execute_batch(&format!(
        "PRAGMA journal_mode = WAL;\
         PRAGMA busy_timeout = {};\
         PRAGMA foreign_keys = ON;\
         PRAGMA cache_size = -{};\
         PRAGMA synchronous = NORMAL;",
        config.busy_timeout_ms, config.cache_size_kib
    ))?;
    Ok(())
}

/// Open (creating if needed) a file-backed database.
pub fn open_file(path: &Path, config: &ConnectionConfig) -> Result<Connection> {
    let conn = Connection::open(path)?;
    configure(&conn, config)?;
    Ok(conn)
}

/// Open a private in-memory database (for tests and dry runs).
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn, &ConnectionConfig::default())?;
    Ok(conn)
}

/// Pragma state for verification.
#[derive(Debug)]
pub struct PragmaState {
    /// Journal mode (`wal` on disk, `memory` in memory).
    pub journal_mode: String,
    /// Whether foreign keys are enabled.
    pub foreign_keys_enabled: bool,
}

/// Read back the pragmas [`configure`] sets.
pub fn verify_pragmas(conn: &Connection) -> Result<PragmaState> {
    let journal_mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
    let foreign_keys: i32 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
    Ok(PragmaState {
        journal_mode,
        foreign_keys_enabled: foreign_keys == 1,
    })
}
