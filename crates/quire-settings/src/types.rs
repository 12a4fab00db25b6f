//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and `#[serde(default)]`,
//! so a settings file may name only the fields it changes.

use serde::{Deserialize, Serialize};

use crate::loader::quire_home;

/// Root settings type.
///
/// # JSON Format
///
/// ```json
/// {
///   "dbPath": "/home/me/.quire/quire.db",
///   "skillsDirs": ["skills", "vendor/skills"],
///   "promptsDirs": ["prompts"],
///   "logging": { "level": "info" }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuireSettings {
    /// Path to the `SQLite` database file.
    pub db_path: String,
    /// Root directories scanned for skills.
    pub skills_dirs: Vec<String>,
    /// Root directories scanned for prompts.
    pub prompts_dirs: Vec<String>,
    /// Extension (without dot) of files picked up by the scanner.
    pub file_extension: String,
    /// Files larger than this are skipped with a warning.
    pub max_file_bytes: u64,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for QuireSettings {
    fn default() -> Self {
        Self {
            db_path: quire_home().join("quire.db").to_string_lossy().into_owned(),
            skills_dirs: vec!["skills".to_string()],
            prompts_dirs: vec!["prompts".to_string()],
            file_extension: "md".to_string(),
            max_file_bytes: 1_048_576,
            logging: LoggingSettings::default(),
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level written to stderr (`RUST_LOG` still wins).
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(QuireSettings::default()).unwrap();
        assert!(json.get("skillsDirs").is_some());
        assert!(json.get("maxFileBytes").is_some());
        assert_eq!(json["logging"]["level"], "warn");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: QuireSettings =
            serde_json::from_str(r#"{"fileExtension": "markdown"}"#).unwrap();
        assert_eq!(settings.file_extension, "markdown");
        assert_eq!(settings.skills_dirs, vec!["skills".to_string()]);
    }
}
