/// Moving documents into their category directories.
///
/// Every move either succeeds, is skipped because a file with the same name
/// already sits in the destination, or fails with an [`OrganizeError`]. A
/// failed move never stops the remaining moves; the caller records it and
/// carries on.
use crate::file_category::Category;
use crate::output::OutputFormatter;
use crate::report::{MovedFile, RunReport};
use crate::scanner::CandidateFile;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A completed move.
#[derive(Debug, Clone)]
pub struct Operation {
    /// The new path of the file after organization.
    pub new_path: PathBuf,
    /// The category directory the file was moved to.
    pub category: String,
}

impl Operation {
    /// The report entry for this move; `docs_label` is the docs root as shown to users.
    pub fn to_moved_file(&self, docs_label: &str) -> MovedFile {
        MovedFile {
            file: self
                .new_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            from: docs_label.to_string(),
            to: format!("{}{}/", docs_label, self.category),
        }
    }
}

/// What happened to a single file.
#[derive(Debug)]
pub enum MoveOutcome {
    /// The file now lives in its category directory.
    Moved(Operation),
    /// A file with the same name already exists there; nothing was touched.
    Skipped { destination: PathBuf },
}

/// Errors that can occur during file organization operations.
#[derive(Debug)]
pub enum OrganizeError {
    /// Failed to create a category directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move a file to its category directory.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// The base directory path is invalid or doesn't exist.
    InvalidBasePath {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::InvalidBasePath { path, source } => {
                write!(f, "Invalid base path {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Moves documents into category subdirectories of a docs root.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Moves a file into `base_path/category_dir_name/`, creating the directory if needed.
    ///
    /// If the destination already exists the file is left alone and
    /// [`MoveOutcome::Skipped`] is returned.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tidydocs::file_organizer::{FileOrganizer, MoveOutcome};
    /// use std::path::Path;
    ///
    /// let result = FileOrganizer::move_to_category(
    ///     Path::new("/path/to/docs"),
    ///     Path::new("/path/to/docs/README.md"),
    ///     "01-核心文档",
    /// );
    ///
    /// match result {
    ///     Ok(MoveOutcome::Moved(op)) => println!("Moved to {}", op.new_path.display()),
    ///     Ok(MoveOutcome::Skipped { destination }) => println!("{} exists", destination.display()),
    ///     Err(e) => eprintln!("Organization failed: {}", e),
    /// }
    /// ```
    pub fn move_to_category(
        base_path: &Path,
        file_path: &Path,
        category_dir_name: &str,
    ) -> OrganizeResult<MoveOutcome> {
        if !base_path.is_dir() {
            return Err(OrganizeError::InvalidBasePath {
                path: base_path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "base path does not exist",
                ),
            });
        }

        let category_path = base_path.join(category_dir_name);
        fs::create_dir_all(&category_path).map_err(|e| {
            OrganizeError::DirectoryCreationFailed {
                path: category_path.clone(),
                source: e,
            }
        })?;

        let file_name = file_path
            .file_name()
            .ok_or_else(|| OrganizeError::FileMoveFailure {
                source: file_path.to_path_buf(),
                destination: category_path.clone(),
                source_error: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "file has no name component",
                ),
            })?;

        let destination_path = category_path.join(file_name);
        if destination_path.exists() {
            return Ok(MoveOutcome::Skipped {
                destination: destination_path,
            });
        }

        fs::rename(file_path, &destination_path).map_err(|e| OrganizeError::FileMoveFailure {
            source: file_path.to_path_buf(),
            destination: destination_path.clone(),
            source_error: e,
        })?;

        Ok(MoveOutcome::Moved(Operation {
            new_path: destination_path,
            category: category_dir_name.to_string(),
        }))
    }

    /// Applies a whole classification plan, recording every outcome in `report`.
    ///
    /// `docs_label` is the docs root as it should appear in the report
    /// (for example `docs/`). Returns the number of files actually moved.
    pub fn apply_plan(
        docs_root: &Path,
        docs_label: &str,
        plan: &BTreeMap<Category, Vec<CandidateFile>>,
        report: &mut RunReport,
    ) -> usize {
        let total: usize = plan.values().map(Vec::len).sum();
        let progress = OutputFormatter::create_progress_bar(total as u64);
        let mut moved = 0;

        for (category, files) in plan {
            let dir_name = category.dir_name();

            for file in files {
                let file_name = file.file_name();
                match Self::move_to_category(docs_root, &file.path, dir_name) {
                    Ok(MoveOutcome::Moved(op)) => {
                        moved += 1;
                        progress.suspend(|| {
                            OutputFormatter::success(&format!(
                                "Moved: {} -> {}",
                                file_name, op.category
                            ))
                        });
                        report.record_move(op.to_moved_file(docs_label));
                    }
                    Ok(MoveOutcome::Skipped { .. }) => {
                        report.record_skip(format!("{}{}/{}", docs_label, dir_name, file_name));
                        progress.suspend(|| {
                            OutputFormatter::warning(&format!(
                                "Skipped (already exists): {} -> {}",
                                file_name, dir_name
                            ))
                        });
                    }
                    Err(e) => {
                        let message = format!("Error moving {} to {}: {}", file_name, dir_name, e);
                        progress.suspend(|| OutputFormatter::error(&message));
                        report.record_error(message);
                    }
                }
                progress.inc(1);
            }
        }

        progress.finish_and_clear();
        moved
    }
}
