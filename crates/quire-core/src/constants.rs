//! Package-level constants.

/// Current version of quire (sourced from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name.
pub const NAME: &str = "quire";

/// Search result count used when the caller gives none.
pub const DEFAULT_SEARCH_LIMIT: i64 = 50;

/// Upper bound on search results per query.
pub const MAX_SEARCH_LIMIT: i64 = 1000;

/// Rough bytes-per-token ratio used for `token_count`.
pub const BYTES_PER_TOKEN: usize = 4;
