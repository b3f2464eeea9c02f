//! tidydocs - project documentation sorting and test-file cleanup
//!
//! This library classifies loose documentation files into numbered topic
//! folders by file name, renders a markdown index of the docs tree, finds
//! throwaway test scripts and removes them after taking a backup, and records
//! everything in a per-run JSON report.

pub mod cleaner;
pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod index;
pub mod output;
pub mod report;
pub mod scanner;

pub use cleaner::{BackupSet, CleanError, TestFileCleaner};
pub use config::{ConfigError, DocFilter, HousekeepingConfig};
pub use file_category::{Category, Classification, DocClassifier};
pub use file_organizer::{FileOrganizer, MoveOutcome, OrganizeError};
pub use report::{ReportError, RunReport};
pub use scanner::CandidateFile;

pub use cli::{RunOptions, RunOutcome, run_cli};
