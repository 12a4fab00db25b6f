//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`QuireSettings::default()`]
//! 2. If the settings file exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::QuireSettings;

/// Resolve the quire home directory (`$QUIRE_HOME`, else `~/.quire`).
pub fn quire_home() -> PathBuf {
    if let Some(home) = std::env::var_os("QUIRE_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".quire")
}

/// Resolve the path to the settings file (`<quire home>/settings.json`).
pub fn settings_path() -> PathBuf {
    quire_home().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<QuireSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, or the result names no scan directories, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<QuireSettings> {
    let mut settings = load_file_layer(path)?;
    apply_env_overrides(&mut settings);
    validate(&settings)?;
    Ok(settings)
}

/// Defaults deep-merged with the settings file, without env overrides.
fn load_file_layer(path: &Path) -> Result<QuireSettings> {
    let defaults = serde_json::to_value(QuireSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

fn validate(settings: &QuireSettings) -> Result<()> {
    if settings.skills_dirs.is_empty() && settings.prompts_dirs.is_empty() {
        return Err(SettingsError::InvalidValue(
            "at least one of skillsDirs or promptsDirs must be set".to_string(),
        ));
    }
    if settings.file_extension.trim().is_empty() {
        return Err(SettingsError::InvalidValue(
            "fileExtension must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply process environment overrides to loaded settings.
pub fn apply_env_overrides(settings: &mut QuireSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup`.
///
/// - `QUIRE_DB_PATH`: database file
/// - `QUIRE_SKILLS_DIRS`, `QUIRE_PROMPTS_DIRS`: `:`-separated directory lists
/// - `QUIRE_FILE_EXTENSION`: scanned extension, leading dot optional
/// - `QUIRE_MAX_FILE_BYTES`: 1 B – 64 MiB
/// - `QUIRE_LOG_LEVEL`: tracing level
///
/// Empty and invalid values are ignored (invalid ones with a warning).
pub fn apply_overrides_from(settings: &mut QuireSettings, lookup: impl Fn(&str) -> Option<String>) {
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(v) = read("QUIRE_DB_PATH") {
        settings.db_path = v;
    }
    if let Some(v) = read("QUIRE_SKILLS_DIRS") {
        settings.skills_dirs = parse_dir_list(&v);
    }
    if let Some(v) = read("QUIRE_PROMPTS_DIRS") {
        settings.prompts_dirs = parse_dir_list(&v);
    }
    if let Some(v) = read("QUIRE_FILE_EXTENSION") {
        settings.file_extension = v.trim_start_matches('.').to_string();
    }
    if let Some(v) = read("QUIRE_MAX_FILE_BYTES") {
        match parse_u64_range(&v, 1, 64 * 1_048_576) {
            Some(n) => settings.max_file_bytes = n,
            None => tracing::warn!(key = "QUIRE_MAX_FILE_BYTES", value = %v, "invalid u64 env var, ignoring"),
        }
    }
    if let Some(v) = read("QUIRE_LOG_LEVEL") {
        match parse_log_level(&v) {
            Some(level) => settings.logging.level = level.to_string(),
            None => tracing::warn!(key = "QUIRE_LOG_LEVEL", value = %v, "invalid log level env var, ignoring"),
        }
    }
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Split a `:`-separated directory list, dropping empty segments.
pub fn parse_dir_list(val: &str) -> Vec<String> {
    val.split(':')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Normalise a tracing level name (case-insensitive).
pub fn parse_log_level(val: &str) -> Option<&'static str> {
    match val.trim().to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" => Some("error"),
        "off" => Some("off"),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"logging": {"level": "warn", "other": 1}});
        let source = serde_json::json!({"logging": {"level": "debug"}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["logging"]["level"], "debug");
        assert_eq!(merged["logging"]["other"], 1);
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"skillsDirs": ["a", "b"]});
        let source = serde_json::json!({"skillsDirs": ["c"]});
        let merged = deep_merge(target, source);
        assert_eq!(merged["skillsDirs"], serde_json::json!(["c"]));
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let source = serde_json::json!({"a": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_new_keys_added() {
        let merged = deep_merge(serde_json::json!({"a": 1}), serde_json::json!({"b": 2}));
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    // ── file layer ──────────────────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let settings = load_file_layer(Path::new("/nonexistent/settings.json")).unwrap();
        assert_eq!(settings, QuireSettings::default());
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"skillsDirs": ["docs/skills"], "logging": {"level": "info"}}"#,
        )
        .unwrap();

        let settings = load_file_layer(&path).unwrap();
        assert_eq!(settings.skills_dirs, vec!["docs/skills".to_string()]);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.prompts_dirs, vec!["prompts".to_string()]);
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();

        let result = load_file_layer(&path);
        assert!(matches!(result.unwrap_err(), SettingsError::Json(_)));
    }

    #[test]
    fn validate_rejects_no_directories() {
        let settings = QuireSettings {
            skills_dirs: vec![],
            prompts_dirs: vec![],
            ..QuireSettings::default()
        };
        assert!(matches!(
            validate(&settings),
            Err(SettingsError::InvalidValue(_))
        ));
    }

    #[test]
    fn validate_rejects_empty_extension() {
        let settings = QuireSettings {
            file_extension: " ".to_string(),
            ..QuireSettings::default()
        };
        assert!(validate(&settings).is_err());
    }

    // ── env overrides ───────────────────────────────────────────────

    #[test]
    fn overrides_apply() {
        let mut settings = QuireSettings::default();
        apply_overrides_from(
            &mut settings,
            env(&[
                ("QUIRE_DB_PATH", "/tmp/q.db"),
                ("QUIRE_SKILLS_DIRS", "a:b::c"),
                ("QUIRE_FILE_EXTENSION", ".markdown"),
                ("QUIRE_MAX_FILE_BYTES", "2048"),
                ("QUIRE_LOG_LEVEL", "DEBUG"),
            ]),
        );
        assert_eq!(settings.db_path, "/tmp/q.db");
        assert_eq!(settings.skills_dirs, vec!["a", "b", "c"]);
        assert_eq!(settings.file_extension, "markdown");
        assert_eq!(settings.max_file_bytes, 2048);
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn invalid_overrides_ignored() {
        let mut settings = QuireSettings::default();
        apply_overrides_from(
            &mut settings,
            env(&[
                ("QUIRE_MAX_FILE_BYTES", "0"),
                ("QUIRE_LOG_LEVEL", "loud"),
                ("QUIRE_DB_PATH", ""),
            ]),
        );
        assert_eq!(settings, QuireSettings::default());
    }

    // ── parsers ─────────────────────────────────────────────────────

    #[test]
    fn parse_dir_list_trims() {
        assert_eq!(parse_dir_list(" x : y "), vec!["x", "y"]);
        assert!(parse_dir_list(":::").is_empty());
    }

    #[test]
    fn parse_u64_bounds() {
        assert_eq!(parse_u64_range("1000", 1, 2000), Some(1000));
        assert_eq!(parse_u64_range("0", 1, 2000), None);
        assert_eq!(parse_u64_range("abc", 1, 2000), None);
    }

    #[test]
    fn parse_log_level_aliases() {
        assert_eq!(parse_log_level("Warning"), Some("warn"));
        assert_eq!(parse_log_level("trace"), Some("trace"));
        assert_eq!(parse_log_level("verbose"), None);
    }
}
