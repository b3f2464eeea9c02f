//! Discovery of loose documents and stray test scripts.

use crate::config::{DocFilter, HousekeepingConfig};
use glob::Pattern;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// A file found by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Absolute path to the file.
    pub path: PathBuf,
    /// Path relative to the scan root (the docs root or the workspace).
    pub relative_path: PathBuf,
    /// Lower-cased extension, if any.
    pub extension: Option<String>,
    /// Size in bytes at scan time.
    pub size: u64,
}

impl CandidateFile {
    fn from_path(path: PathBuf, root: &Path) -> Option<Self> {
        let metadata = fs::metadata(&path).ok()?;
        if !metadata.is_file() {
            return None;
        }

        let relative_path = path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.clone());
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());

        Some(Self {
            path,
            relative_path,
            extension,
            size: metadata.len(),
        })
    }

    /// The bare file name.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Size in kibibytes, as shown to the user and stored in the report.
    pub fn size_kb(&self) -> f64 {
        self.size as f64 / 1024.0
    }
}

/// Result of scanning the docs root.
#[derive(Debug, Clone)]
pub struct DocScan {
    /// Loose documents directly under the docs root, sorted by name.
    pub files: Vec<CandidateFile>,
    /// Number of subdirectories that already exist.
    pub existing_directories: usize,
}

/// Lists the loose documents directly under `docs_root`.
///
/// Subdirectories are counted but never descended into. Returns `None` when
/// the docs root does not exist or cannot be read.
pub fn scan_docs(docs_root: &Path, filter: &DocFilter) -> Option<DocScan> {
    let entries = fs::read_dir(docs_root).ok()?;

    let mut files = Vec::new();
    let mut existing_directories = 0;

    for entry in entries.flatten() {
        // Follows symlinks, so a linked document counts as a document.
        let path = entry.path();

        if path.is_dir() {
            existing_directories += 1;
        } else if path.is_file()
            && filter.should_include(&path)
            && let Some(candidate) = CandidateFile::from_path(path, docs_root)
        {
            files.push(candidate);
        }
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    Some(DocScan {
        files,
        existing_directories,
    })
}

/// Finds test scripts in the workspace root and any configured extra roots.
///
/// Results are de-duplicated by canonical path and sorted by their path
/// relative to the workspace. Missing extra roots contribute nothing.
pub fn scan_test_files(workspace: &Path, config: &HousekeepingConfig) -> Vec<CandidateFile> {
    let mut roots: Vec<(PathBuf, &[String])> =
        vec![(workspace.to_path_buf(), config.tests.patterns.as_slice())];
    for extra in &config.tests.extra_roots {
        let dir = workspace.join(&extra.dir);
        if dir.is_dir() {
            roots.push((dir, extra.patterns.as_slice()));
        }
    }

    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for (root, patterns) in roots {
        for path in glob_in(&root, patterns) {
            let identity = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
            if !seen.insert(identity) {
                continue;
            }
            if let Some(candidate) = CandidateFile::from_path(path, workspace) {
                found.push(candidate);
            }
        }
    }

    found.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    found
}

/// Expands each pattern inside `root` (non-recursive).
fn glob_in(root: &Path, patterns: &[String]) -> Vec<PathBuf> {
    let escaped_root = Pattern::escape(&root.to_string_lossy());

    patterns
        .iter()
        .filter_map(|pattern| glob::glob(&format!("{}/{}", escaped_root, pattern)).ok())
        .flat_map(|paths| paths.flatten())
        .collect()
}
