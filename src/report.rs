//! The per-run JSON report.
//!
//! A [`RunReport`] is created once at the start of a run, handed by `&mut`
//! to each stage, and written to the workspace root once at the end.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of the report file name; the run timestamp follows it.
pub const REPORT_FILE_PREFIX: &str = "organize_report_";

/// Errors raised while writing generated artifacts.
#[derive(Debug)]
pub enum ReportError {
    /// The report could not be serialized.
    Serialize(serde_json::Error),
    /// The artifact could not be written.
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(e) => write!(f, "Failed to serialize report: {}", e),
            Self::Write { path, source } => {
                write!(f, "Failed to write {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ReportError {}

/// Summary of one doc scan.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OrganizedSummary {
    pub total_root_files: usize,
    pub existing_directories: usize,
    /// Files per category folder.
    pub categorized: BTreeMap<String, usize>,
}

/// A test file that was backed up and removed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeletedFile {
    /// Path relative to the workspace.
    pub file: String,
    /// Size before deletion.
    pub size_kb: f64,
    /// Backup copy, relative to the workspace.
    pub backup: String,
}

/// A document that was moved into a category folder.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MovedFile {
    pub file: String,
    pub from: String,
    pub to: String,
}

/// Everything that happened during one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub timestamp: String,
    pub organized_files: Vec<OrganizedSummary>,
    pub deleted_test_files: Vec<DeletedFile>,
    pub moved_files: Vec<MovedFile>,
    /// Moves skipped because the destination already existed.
    pub skipped_files: Vec<String>,
    pub errors: Vec<String>,
    #[serde(skip)]
    started_at: DateTime<Local>,
}

impl RunReport {
    /// Starts an empty report stamped with the current local time.
    pub fn new() -> Self {
        Self::started_at(Local::now())
    }

    /// Starts an empty report stamped with `started_at`.
    pub fn started_at(started_at: DateTime<Local>) -> Self {
        Self {
            timestamp: started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            organized_files: Vec::new(),
            deleted_test_files: Vec::new(),
            moved_files: Vec::new(),
            skipped_files: Vec::new(),
            errors: Vec::new(),
            started_at,
        }
    }

    pub fn record_summary(&mut self, summary: OrganizedSummary) {
        self.organized_files.push(summary);
    }

    pub fn record_move(&mut self, moved: MovedFile) {
        self.moved_files.push(moved);
    }

    pub fn record_skip(&mut self, path: String) {
        self.skipped_files.push(path);
    }

    pub fn record_deletion(&mut self, deleted: DeletedFile) {
        self.deleted_test_files.push(deleted);
    }

    pub fn record_error(&mut self, message: String) {
        self.errors.push(message);
    }

    /// When the run started.
    pub fn run_started(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Path the report will be written to inside `workspace`.
    pub fn file_path(&self, workspace: &Path) -> PathBuf {
        workspace.join(format!(
            "{}{}.json",
            REPORT_FILE_PREFIX,
            self.started_at.format("%Y%m%d_%H%M%S")
        ))
    }

    /// First report path in `workspace` not already taken.
    ///
    /// Runs started within the same second get `_1`, `_2`, ... appended.
    fn free_path(&self, workspace: &Path) -> PathBuf {
        let candidate = self.file_path(workspace);
        if !candidate.exists() {
            return candidate;
        }

        let stamp = self.started_at.format("%Y%m%d_%H%M%S");
        (1..)
            .map(|n| workspace.join(format!("{}{}_{}.json", REPORT_FILE_PREFIX, stamp, n)))
            .find(|path| !path.exists())
            .unwrap_or(candidate)
    }

    /// Writes the report as pretty-printed JSON and returns its path.
    ///
    /// An earlier report with the same timestamp is never overwritten.
    pub fn save(&self, workspace: &Path) -> Result<PathBuf, ReportError> {
        let path = self.free_path(workspace);
        let json = serde_json::to_string_pretty(self).map_err(ReportError::Serialize)?;

        fs::write(&path, json).map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
