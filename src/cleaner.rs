//! Backup-then-delete removal of stray test scripts.

use crate::output::OutputFormatter;
use crate::report::{DeletedFile, RunReport};
use crate::scanner::CandidateFile;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur while cleaning a single file.
#[derive(Debug)]
pub enum CleanError {
    /// The backup directory could not be created.
    BackupDirFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file could not be copied into the backup set.
    BackupCopyFailed {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// The backup was taken but the original could not be removed.
    DeleteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The candidate path has no file name.
    MissingFileName(PathBuf),
}

impl std::fmt::Display for CleanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BackupDirFailed { path, source } => {
                write!(
                    f,
                    "Failed to create backup directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::BackupCopyFailed {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to back up {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::DeleteFailed { path, source } => {
                write!(f, "Failed to delete {}: {}", path.display(), source)
            }
            Self::MissingFileName(path) => {
                write!(f, "Path has no file name: {}", path.display())
            }
        }
    }
}

impl std::error::Error for CleanError {}

/// Result type for cleaning operations.
pub type CleanResult<T> = Result<T, CleanError>;

/// The timestamped directory that holds this run's pre-deletion copies.
///
/// Nothing is created on disk until the first call to [`BackupSet::store`].
#[derive(Debug)]
pub struct BackupSet {
    run_dir: PathBuf,
    files_dir: PathBuf,
    created: bool,
}

impl BackupSet {
    /// Plans a backup set under `backup_root` named after `started_at`.
    ///
    /// Example: `backup/backup_20251107_095413/test_files/`
    pub fn new(backup_root: &Path, started_at: DateTime<Local>) -> Self {
        let run_dir = backup_root.join(format!("backup_{}", started_at.format("%Y%m%d_%H%M%S")));
        let files_dir = run_dir.join("test_files");
        Self {
            run_dir,
            files_dir,
            created: false,
        }
    }

    /// The per-run directory.
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Whether anything has been written yet.
    pub fn is_created(&self) -> bool {
        self.created
    }

    fn ensure_created(&mut self) -> CleanResult<()> {
        if !self.created {
            fs::create_dir_all(&self.files_dir).map_err(|e| CleanError::BackupDirFailed {
                path: self.files_dir.clone(),
                source: e,
            })?;
            self.created = true;
        }
        Ok(())
    }

    /// Copies `file` into the set by base name and returns the copy's path.
    ///
    /// A name already taken in this set gets a numeric suffix
    /// (`test_api.1.js`) instead of being overwritten.
    pub fn store(&mut self, file: &Path) -> CleanResult<PathBuf> {
        self.ensure_created()?;

        let file_name = file
            .file_name()
            .ok_or_else(|| CleanError::MissingFileName(file.to_path_buf()))?;
        let destination = self.free_slot(Path::new(file_name));

        fs::copy(file, &destination).map_err(|e| CleanError::BackupCopyFailed {
            source: file.to_path_buf(),
            destination: destination.clone(),
            source_error: e,
        })?;

        Ok(destination)
    }

    fn free_slot(&self, file_name: &Path) -> PathBuf {
        let candidate = self.files_dir.join(file_name);
        if !candidate.exists() {
            return candidate;
        }

        let stem = file_name
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = file_name
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        (1..)
            .map(|n| self.files_dir.join(format!("{}.{}{}", stem, n, extension)))
            .find(|path| !path.exists())
            .unwrap_or(candidate)
    }
}

/// Removes test files after copying each one into a [`BackupSet`].
pub struct TestFileCleaner;

impl TestFileCleaner {
    /// Backs up and deletes one file.
    ///
    /// The original is only removed once its copy is in place. Returns the
    /// backup path.
    pub fn backup_and_delete(backup: &mut BackupSet, file: &Path) -> CleanResult<PathBuf> {
        let backup_path = backup.store(file)?;

        fs::remove_file(file).map_err(|e| CleanError::DeleteFailed {
            path: file.to_path_buf(),
            source: e,
        })?;

        Ok(backup_path)
    }

    /// Cleans every candidate, recording each outcome in `report`.
    ///
    /// Returns the number of files deleted.
    pub fn clean_all(
        workspace: &Path,
        backup: &mut BackupSet,
        candidates: &[CandidateFile],
        report: &mut RunReport,
    ) -> usize {
        let progress = OutputFormatter::create_progress_bar(candidates.len() as u64);
        let mut deleted = 0;

        for candidate in candidates {
            let shown = candidate.relative_path.display().to_string();
            match Self::backup_and_delete(backup, &candidate.path) {
                Ok(backup_path) => {
                    deleted += 1;
                    report.record_deletion(DeletedFile {
                        file: shown.clone(),
                        size_kb: candidate.size_kb(),
                        backup: relative_to(&backup_path, workspace),
                    });
                    progress.suspend(|| OutputFormatter::success(&format!("Deleted: {}", shown)));
                }
                Err(e) => {
                    let message = format!("Error deleting {}: {}", shown, e);
                    progress.suspend(|| OutputFormatter::error(&message));
                    report.record_error(message);
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        deleted
    }
}

fn relative_to(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
