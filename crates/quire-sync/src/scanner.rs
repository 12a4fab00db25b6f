//! Filesystem scanner.
//!
//! Walks one or more roots recursively and returns every file with the
//! configured extension, in lexicographic path order. Hidden entries are
//! skipped and symlinks are not followed. Files that cannot be used
//! (unreadable, not UTF-8, too large) become [`ScanIssue`]s rather than
//! errors so one bad file never blocks a pass.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::errors::ScanError;

/// Scanner settings.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Extension to collect, without the dot; compared case-insensitively.
    pub extension: String,
    /// Files larger than this are reported and skipped.
    pub max_file_bytes: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extension: "md".to_string(),
            max_file_bytes: 1_048_576,
        }
    }
}

/// One file found under a scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Absolute file path.
    pub path: PathBuf,
    /// Canonical root the file was found under.
    pub root: PathBuf,
    /// Raw UTF-8 content.
    pub content: String,
}

impl ScannedFile {
    /// Path as stored in the index.
    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// File stem.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Parent directory relative to the root, `/`-joined; empty at the root.
    pub fn category(&self) -> String {
        self.path
            .parent()
            .and_then(|p| p.strip_prefix(&self.root).ok())
            .map(|rel| {
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default()
    }
}

/// A file skipped during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanIssue {
    /// Offending path.
    pub path: String,
    /// Why it was skipped.
    pub message: String,
}

/// Everything one scan produced.
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    /// Usable files, ordered by path.
    pub files: Vec<ScannedFile>,
    /// Skipped files.
    pub issues: Vec<ScanIssue>,
}

/// Scan `roots` for files matching `opts`.
///
/// A missing or non-directory root is fatal. Files reachable from more than
/// one root are reported once.
pub fn scan(roots: &[PathBuf], opts: &ScanOptions) -> Result<ScanOutput, ScanError> {
    let mut output = ScanOutput::default();

    for root in roots {
        let root = resolve_root(root)?;
        scan_root(&root, opts, &mut output);
    }

    output.files.sort_by(|a, b| a.path.as_os_str().cmp(b.path.as_os_str()));
    output.files.dedup_by(|a, b| a.path == b.path);
    output.issues.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(output)
}

fn resolve_root(root: &Path) -> Result<PathBuf, ScanError> {
    let resolved = std::fs::canonicalize(root).map_err(|_| ScanError::MissingRoot {
        path: root.display().to_string(),
    })?;
    if !resolved.is_dir() {
        return Err(ScanError::NotADirectory {
            path: resolved.display().to_string(),
        });
    }
    Ok(resolved)
}

fn scan_root(root: &Path, opts: &ScanOptions, output: &mut ScanOutput) {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .map_or_else(|| root.display().to_string(), |p| p.display().to_string());
                report(output, path, format!("Failed to read entry: {e}"));
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            debug!(path = %entry.path().display(), "skipping symlink");
            continue;
        }
        if !file_type.is_file() || !has_extension(entry.path(), &opts.extension) {
            continue;
        }

        match load_file(&entry, opts.max_file_bytes) {
            Ok(content) => {
                debug!(path = %entry.path().display(), bytes = content.len(), "scanned file");
                output.files.push(ScannedFile {
                    path: entry.path().to_path_buf(),
                    root: root.to_path_buf(),
                    content,
                });
            }
            Err(message) => report(output, entry.path().display().to_string(), message),
        }
    }
}

fn load_file(entry: &DirEntry, max_file_bytes: u64) -> Result<String, String> {
    let metadata = entry
        .metadata()
        .map_err(|e| format!("Failed to read metadata: {e}"))?;
    let size = metadata.len();
    if size > max_file_bytes {
        return Err(format!(
            "File too large: {size} bytes (max {max_file_bytes} bytes)"
        ));
    }
    let bytes = std::fs::read(entry.path()).map_err(|e| format!("Failed to read file: {e}"))?;
    String::from_utf8(bytes).map_err(|e| format!("File is not valid UTF-8: {e}"))
}

fn report(output: &mut ScanOutput, path: String, message: String) {
    warn!(path = %path, message = %message, "skipping file");
    output.issues.push(ScanIssue { path, message });
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}
