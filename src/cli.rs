//! Command-line interface module for tidydocs.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Sorting loose docs and printing the plan
//! - Index generation
//! - Test-file inventory and cleanup
//! - Writing the run report

use crate::cleaner::{BackupSet, TestFileCleaner};
use crate::config::{DocFilter, HousekeepingConfig};
use crate::file_category::{Category, DocClassifier};
use crate::file_organizer::FileOrganizer;
use crate::index::write_index;
use crate::output::OutputFormatter;
use crate::report::{OrganizedSummary, RunReport};
use crate::scanner::{CandidateFile, scan_docs, scan_test_files};
use clap::Parser;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Sort loose project docs into topical folders and clean up stray test scripts.
///
/// Without flags nothing on disk changes apart from the JSON run report.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "tidydocs", version, about)]
pub struct RunOptions {
    /// Workspace root to operate on.
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Move docs into category folders and regenerate the docs index.
    #[arg(long)]
    pub organize: bool,

    /// Back up and delete test scripts.
    #[arg(long)]
    pub delete: bool,

    /// Configuration file (defaults to <workspace>/.tidydocsrc.toml if present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Ignore ~/.config/tidydocs/config.toml.
    #[arg(long)]
    pub no_user_config: bool,
}

/// What a finished run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    pub report_path: PathBuf,
    /// Set when the index was regenerated.
    pub index_path: Option<PathBuf>,
    /// Set when at least one file was backed up.
    pub backup_dir: Option<PathBuf>,
}

/// Runs one housekeeping pass over a workspace.
///
/// Per-file failures and configuration problems never make this return an
/// error; they end up in the report. A broken configuration file falls back to
/// the defaults. Only an unwritable report is returned as an error.
///
/// # Examples
///
/// ```no_run
/// use tidydocs::cli::{RunOptions, run_cli};
/// use std::path::PathBuf;
///
/// let options = RunOptions {
///     workspace: PathBuf::from("/path/to/project"),
///     ..Default::default()
/// };
/// match run_cli(&options) {
///     Ok(outcome) => println!("Report: {}", outcome.report_path.display()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(options: &RunOptions) -> Result<RunOutcome, String> {
    let workspace = resolve_workspace(&options.workspace);

    OutputFormatter::banner("🚀 tidydocs - docs sorting and test-file cleanup");
    OutputFormatter::info(&format!("Workspace: {}", workspace.display()));

    let mut report = RunReport::new();
    let mut index_path = None;
    let mut backup_dir = None;

    if let Some((config, filter)) = load_config(&workspace, options, &mut report) {
        let classifier = DocClassifier::default();

        organize_docs(
            &workspace,
            &config,
            &filter,
            &classifier,
            options.organize,
            &mut report,
        );

        if options.organize {
            index_path = generate_index(&workspace, &config, &mut report);
        }

        backup_dir = clean_test_files(&workspace, &config, options.delete, &mut report);
    }

    let report_path = report
        .save(&workspace)
        .map_err(|e| format!("Error saving report: {}", e))?;
    OutputFormatter::header(&format!(
        "📊 Report saved: {}",
        display_relative(&report_path, &workspace)
    ));

    if !report.errors.is_empty() {
        OutputFormatter::warning(&format!(
            "{} error(s) recorded; see the report for details.",
            report.errors.len()
        ));
    }
    OutputFormatter::banner("✅ Done");

    Ok(RunOutcome {
        report,
        report_path,
        index_path,
        backup_dir,
    })
}

/// Loads and compiles the configuration.
///
/// A file that cannot be read or compiled is recorded as a report error and
/// the defaults are used instead. Returns `None` only if the defaults fail to
/// compile as well.
fn load_config(
    workspace: &Path,
    options: &RunOptions,
    report: &mut RunReport,
) -> Option<(HousekeepingConfig, DocFilter)> {
    let home = if options.no_user_config {
        None
    } else {
        std::env::var_os("HOME").map(PathBuf::from)
    };

    let loaded =
        HousekeepingConfig::load_with_home(workspace, options.config.as_deref(), home.as_deref())
            .and_then(|config| config.compile().map(|filter| (config, filter)));
    let error = match loaded {
        Ok(pair) => return Some(pair),
        Err(e) => e,
    };

    let message = format!("Error loading configuration: {}", error);
    OutputFormatter::error(&message);
    report.record_error(message);
    OutputFormatter::warning("Using the default configuration for this run.");

    let config = HousekeepingConfig::default();
    match config.compile() {
        Ok(filter) => Some((config, filter)),
        Err(e) => {
            let message = format!("Error compiling default configuration: {}", e);
            OutputFormatter::error(&message);
            report.record_error(message);
            None
        }
    }
}

/// Canonicalizes the workspace, falling back to an absolute path when it does not exist.
fn resolve_workspace(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

/// Groups candidates by category, keeping scan order within each group.
pub fn build_plan(
    classifier: &DocClassifier,
    files: &[CandidateFile],
) -> BTreeMap<Category, Vec<CandidateFile>> {
    let mut plan: BTreeMap<Category, Vec<CandidateFile>> = BTreeMap::new();
    for file in files {
        plan.entry(classifier.classify(&file.file_name()))
            .or_default()
            .push(file.clone());
    }
    plan
}

/// Classifies the loose docs, prints the plan and moves them when `write` is set.
fn organize_docs(
    workspace: &Path,
    config: &HousekeepingConfig,
    filter: &DocFilter,
    classifier: &DocClassifier,
    write: bool,
    report: &mut RunReport,
) {
    OutputFormatter::header("📁 Sorting documents...");

    let docs_root = config.docs_root(workspace);
    let Some(scan) = scan_docs(&docs_root, filter) else {
        OutputFormatter::warning(&format!(
            "Docs folder not found: {}",
            docs_root.display()
        ));
        return;
    };

    OutputFormatter::plain(&format!(
        "Found {} loose document(s), {} existing folder(s)",
        scan.files.len(),
        scan.existing_directories
    ));

    let plan = build_plan(classifier, &scan.files);
    let counts: BTreeMap<String, usize> = plan
        .iter()
        .map(|(category, files)| (category.dir_name().to_string(), files.len()))
        .collect();

    OutputFormatter::header("📋 Classification:");
    for (category, files) in &plan {
        OutputFormatter::plain(&format!(
            "  📂 {} - {} ({} files)",
            category.dir_name(),
            category.description(),
            files.len()
        ));
        for file in files {
            let name = file.file_name();
            let rule = classifier.explain(&name).rule;
            OutputFormatter::plain(&format!("     - {} [{}]", name, rule));
        }
    }
    if !plan.is_empty() {
        OutputFormatter::summary_table(&counts, scan.files.len());
    }

    if write {
        OutputFormatter::header("📦 Moving files...");
        let docs_label = format!("{}/", config.layout.docs_dir.trim_end_matches('/'));
        let moved = FileOrganizer::apply_plan(&docs_root, &docs_label, &plan, report);
        OutputFormatter::plain(&format!(
            "\nMoved {} of {} file(s)",
            moved,
            scan.files.len()
        ));
    } else {
        OutputFormatter::dry_run_notice("Preview only - no documents were moved.");
        OutputFormatter::plain("Run with --organize to move them.");
    }

    report.record_summary(OrganizedSummary {
        total_root_files: scan.files.len(),
        existing_directories: scan.existing_directories,
        categorized: counts,
    });
}

/// Regenerates the docs index. Failures are recorded, not returned.
fn generate_index(
    workspace: &Path,
    config: &HousekeepingConfig,
    report: &mut RunReport,
) -> Option<PathBuf> {
    OutputFormatter::header("📋 Generating docs index...");

    let docs_root = config.docs_root(workspace);
    match write_index(&docs_root, &config.layout.index_file, report.run_started()) {
        Ok(Some((path, tree))) => {
            OutputFormatter::success(&format!(
                "Index written: {} ({} directories, {} files)",
                display_relative(&path, workspace),
                tree.dirs.len(),
                tree.total_files()
            ));
            Some(path)
        }
        Ok(None) => {
            OutputFormatter::warning("Docs folder not found; index not generated.");
            None
        }
        Err(e) => {
            let message = format!("Error generating index: {}", e);
            OutputFormatter::error(&message);
            report.record_error(message);
            None
        }
    }
}

/// Lists test files and, when `delete` is set, backs them up and removes them.
///
/// Returns the backup directory if one was created.
fn clean_test_files(
    workspace: &Path,
    config: &HousekeepingConfig,
    delete: bool,
    report: &mut RunReport,
) -> Option<PathBuf> {
    OutputFormatter::header("🔍 Looking for test files...");

    let candidates = scan_test_files(workspace, config);
    OutputFormatter::plain(&format!("Found {} test file(s):", candidates.len()));
    for candidate in &candidates {
        OutputFormatter::plain(&format!(
            "  📄 {} ({:.1} KB)",
            candidate.relative_path.display(),
            candidate.size_kb()
        ));
    }

    if candidates.is_empty() {
        OutputFormatter::success("No test files to clean up.");
        return None;
    }

    if !delete {
        OutputFormatter::dry_run_notice("Preview only - no test files were deleted.");
        OutputFormatter::plain("Run with --delete to remove them (a backup copy is kept).");
        return None;
    }

    OutputFormatter::header("🗑️  Cleaning test files...");
    let mut backup = BackupSet::new(&config.backup_root(workspace), report.run_started());
    let deleted = TestFileCleaner::clean_all(workspace, &mut backup, &candidates, report);
    OutputFormatter::plain(&format!(
        "\nDeleted {} of {} test file(s)",
        deleted,
        candidates.len()
    ));

    if backup.is_created() {
        let run_dir = backup.run_dir().to_path_buf();
        OutputFormatter::info(&format!(
            "📦 Backup location: {}",
            display_relative(&run_dir, workspace)
        ));
        Some(run_dir)
    } else {
        None
    }
}
