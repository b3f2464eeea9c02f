use serde_json::Value;
/// Integration tests for tidydocs
///
/// These tests build small project workspaces in temporary directories and run
/// the complete pipeline against them.
///
/// Test categories:
/// 1. Dry-run behaviour
/// 2. Organizing docs and the generated index
/// 3. Skips and partial failures
/// 4. Test-file cleanup and backups
/// 5. Configuration and edge cases
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tidydocs::cli::{RunOptions, run_cli};
use tidydocs::report::REPORT_FILE_PREFIX;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary workspace with helpers for building and inspecting it.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a file (and any missing parents) relative to the workspace.
    fn create_file(&self, rel_path: &str, content: &str) {
        let path = self.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write file");
    }

    fn create_dir(&self, rel_path: &str) {
        fs::create_dir_all(self.path().join(rel_path)).expect("Failed to create directory");
    }

    fn read(&self, rel_path: &str) -> String {
        fs::read_to_string(self.path().join(rel_path)).expect("Failed to read file")
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_file_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "File should not exist: {}", path.display());
    }

    fn options(&self) -> RunOptions {
        RunOptions {
            workspace: self.path().to_path_buf(),
            no_user_config: true,
            ..Default::default()
        }
    }

    /// Every file and directory under the workspace with its contents, minus run reports.
    fn snapshot(&self) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
        let mut entries = BTreeMap::new();
        Self::walk(self.path(), self.path(), &mut entries);
        entries
    }

    fn walk(root: &Path, dir: &Path, entries: &mut BTreeMap<PathBuf, Option<Vec<u8>>>) {
        for entry in fs::read_dir(dir).expect("Failed to read directory").flatten() {
            let path = entry.path();
            let rel = path.strip_prefix(root).unwrap().to_path_buf();
            if path.is_dir() {
                entries.insert(rel, None);
                Self::walk(root, &path, entries);
            } else if !entry
                .file_name()
                .to_string_lossy()
                .starts_with(REPORT_FILE_PREFIX)
            {
                entries.insert(rel, Some(fs::read(&path).unwrap()));
            }
        }
    }

    fn report_files(&self) -> Vec<PathBuf> {
        fs::read_dir(self.path())
            .unwrap()
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .unwrap()
                    .to_string_lossy()
                    .starts_with(REPORT_FILE_PREFIX)
            })
            .collect()
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

/// A small but realistic project layout.
fn sample_workspace() -> TestFixture {
    let fixture = TestFixture::new();
    fixture.create_file("docs/README.md", "# Project");
    fixture.create_file("docs/用户反馈-优化建议.md", "feedback");
    fixture.create_file("docs/激活码测试.md", "activation tests");
    fixture.create_file("docs/数据库说明.txt", "schema notes");
    fixture.create_file("docs/首页.html", "<html></html>");
    fixture.create_file("docs/logo.png", "png");
    fixture.create_file("docs/02-快速启动指南/部署.md", "already sorted");
    fixture.create_file("test_login.js", "login()");
    fixture.create_file("backend/test_api.js", "api()");
    fixture.create_file("backend/server.js", "server()");
    fixture
}

// ============================================================================
// Test Suite 1: Dry Run
// ============================================================================

#[test]
fn test_dry_run_leaves_tree_unchanged() {
    let fixture = sample_workspace();
    let before = fixture.snapshot();

    let outcome = run_cli(&fixture.options()).expect("Dry run should succeed");

    assert_eq!(before, fixture.snapshot(), "Dry run must not touch the tree");
    assert!(outcome.report_path.is_file());
    assert!(outcome.index_path.is_none());
    assert!(outcome.backup_dir.is_none());

    let summary = &outcome.report.organized_files[0];
    assert_eq!(summary.total_root_files, 5);
    assert_eq!(summary.existing_directories, 1);
    assert_eq!(summary.categorized["05-修复报告"], 1);
    assert!(outcome.report.moved_files.is_empty());
    assert!(outcome.report.deleted_test_files.is_empty());
    assert!(outcome.report.errors.is_empty());
}

#[test]
fn test_dry_run_writes_exactly_one_report() {
    let fixture = sample_workspace();

    let outcome = run_cli(&fixture.options()).unwrap();

    assert_eq!(fixture.report_files().len(), 1);
    let json = read_json(&outcome.report_path);
    for key in [
        "timestamp",
        "organized_files",
        "deleted_test_files",
        "moved_files",
        "errors",
    ] {
        assert!(json.get(key).is_some(), "report is missing {}", key);
    }
    assert_eq!(json["moved_files"].as_array().unwrap().len(), 0);
}

// ============================================================================
// Test Suite 2: Organizing and Indexing
// ============================================================================

#[test]
fn test_organize_moves_feedback_doc_and_indexes_it() {
    let fixture = TestFixture::new();
    fixture.create_file("docs/用户反馈-优化建议.md", "feedback");

    let outcome = run_cli(&RunOptions {
        organize: true,
        ..fixture.options()
    })
    .unwrap();

    fixture.assert_file_not_exists("docs/用户反馈-优化建议.md");
    fixture.assert_file_exists("docs/05-修复报告/用户反馈-优化建议.md");

    assert_eq!(outcome.report.moved_files.len(), 1);
    assert_eq!(outcome.report.moved_files[0].from, "docs/");
    assert_eq!(outcome.report.moved_files[0].to, "docs/05-修复报告/");

    let index = fixture.read("docs/INDEX.md");
    assert!(index.contains("### 📂 05-修复报告 (1 files)"));
    assert!(index.contains("- 📝 [用户反馈-优化建议.md](./05-修复报告/用户反馈-优化建议.md)"));
    assert!(outcome.index_path.is_some());
}

#[test]
fn test_organize_sorts_whole_workspace() {
    let fixture = sample_workspace();

    let outcome = run_cli(&RunOptions {
        organize: true,
        ..fixture.options()
    })
    .unwrap();

    fixture.assert_file_exists("docs/01-核心文档/README.md");
    fixture.assert_file_exists("docs/05-修复报告/用户反馈-优化建议.md");
    fixture.assert_file_exists("docs/06-开发者工具/激活码测试.md");
    fixture.assert_file_exists("docs/06-数据库脚本/数据库说明.txt");
    fixture.assert_file_exists("docs/04-功能开发报告/首页.html");
    // not a document type, stays put
    fixture.assert_file_exists("docs/logo.png");
    fixture.assert_file_exists("docs/02-快速启动指南/部署.md");

    assert_eq!(outcome.report.moved_files.len(), 5);
    assert!(outcome.report.errors.is_empty());

    let index = fixture.read("docs/INDEX.md");
    assert!(index.contains("- 🌐 [首页.html](./04-功能开发报告/首页.html)"));
    assert!(index.contains("- 📄 [数据库说明.txt](./06-数据库脚本/数据库说明.txt)"));
    assert!(index.contains("### 📄 Root documents (1 files)"));
    assert!(index.contains("- 📎 [logo.png](./logo.png)"));
    assert!(index.contains("**📊 Totals**: 6 directories, 7 files"));

    // organize alone only previews test files
    fixture.assert_file_exists("test_login.js");
    fixture.assert_file_exists("backend/test_api.js");
    assert!(outcome.report.deleted_test_files.is_empty());
}

#[test]
fn test_second_organize_run_keeps_index_in_place() {
    let fixture = TestFixture::new();
    fixture.create_file("docs/README.md", "# Project");

    run_cli(&RunOptions {
        organize: true,
        ..fixture.options()
    })
    .unwrap();
    let outcome = run_cli(&RunOptions {
        organize: true,
        ..fixture.options()
    })
    .unwrap();

    fixture.assert_file_exists("docs/INDEX.md");
    fixture.assert_file_not_exists("docs/01-核心文档/INDEX.md");
    assert_eq!(outcome.report.organized_files[0].total_root_files, 0);
    // Both runs keep their own report even when they start in the same second.
    assert_eq!(fixture.report_files().len(), 2);
}

// ============================================================================
// Test Suite 3: Skips and Partial Failures
// ============================================================================

#[test]
fn test_existing_destination_is_skipped() {
    let fixture = TestFixture::new();
    fixture.create_file("docs/README.md", "new readme");
    fixture.create_file("docs/01-核心文档/README.md", "old readme");

    let outcome = run_cli(&RunOptions {
        organize: true,
        ..fixture.options()
    })
    .unwrap();

    assert_eq!(fixture.read("docs/README.md"), "new readme");
    assert_eq!(fixture.read("docs/01-核心文档/README.md"), "old readme");
    assert!(outcome.report.moved_files.is_empty());
    assert_eq!(outcome.report.skipped_files.len(), 1);
    assert!(outcome.report.errors.is_empty());
}

#[test]
fn test_one_failed_move_does_not_stop_the_rest() {
    let fixture = TestFixture::new();
    fixture.create_file("docs/README.md", "core");
    fixture.create_file("docs/登录修复.md", "fix");
    fixture.create_file("docs/功能说明.md", "feature");
    // a plain file where the core-docs folder should go
    fixture.create_file("docs/01-核心文档", "blocker");

    let outcome = run_cli(&RunOptions {
        organize: true,
        ..fixture.options()
    })
    .unwrap();

    assert_eq!(outcome.report.errors.len(), 1);
    assert!(outcome.report.errors[0].contains("README.md"));
    assert_eq!(outcome.report.moved_files.len(), 2);
    fixture.assert_file_exists("docs/README.md");
    fixture.assert_file_exists("docs/03-修复报告/登录修复.md");
    fixture.assert_file_exists("docs/04-功能开发报告/功能说明.md");

    let json = read_json(&outcome.report_path);
    assert_eq!(json["errors"].as_array().unwrap().len(), 1);
}

// ============================================================================
// Test Suite 4: Test-File Cleanup
// ============================================================================

#[test]
fn test_delete_backs_up_then_removes_test_files() {
    let fixture = TestFixture::new();
    fixture.create_file("test_login.js", "login()");
    fixture.create_file("backend/test_api.js", "api()");
    fixture.create_file("backend/server.js", "server()");

    let outcome = run_cli(&RunOptions {
        delete: true,
        ..fixture.options()
    })
    .unwrap();

    fixture.assert_file_not_exists("test_login.js");
    fixture.assert_file_not_exists("backend/test_api.js");
    fixture.assert_file_exists("backend/server.js");

    assert_eq!(outcome.report.deleted_test_files.len(), 2);
    assert!(outcome.report.errors.is_empty());

    let backup_runs: Vec<_> = fs::read_dir(fixture.path().join("backup"))
        .unwrap()
        .flatten()
        .collect();
    assert_eq!(backup_runs.len(), 1, "one backup folder per run");

    let backup_dir = outcome.backup_dir.expect("backup was created");
    let files_dir = backup_dir.join("test_files");
    assert_eq!(fs::read_to_string(files_dir.join("test_login.js")).unwrap(), "login()");
    assert_eq!(fs::read_to_string(files_dir.join("test_api.js")).unwrap(), "api()");
}

#[test]
fn test_backup_matches_original_content() {
    let fixture = TestFixture::new();
    fixture.create_file("test-page.html", "<p>page</p>");
    fixture.create_file("test_setup.ps1", "Write-Host hi");

    let originals: BTreeMap<String, String> = ["test-page.html", "test_setup.ps1"]
        .iter()
        .map(|name| (name.to_string(), fixture.read(name)))
        .collect();

    let outcome = run_cli(&RunOptions {
        delete: true,
        ..fixture.options()
    })
    .unwrap();

    for deleted in &outcome.report.deleted_test_files {
        let backup = fs::read_to_string(fixture.path().join(&deleted.backup)).unwrap();
        assert_eq!(backup, originals[&deleted.file]);
        assert!(deleted.size_kb > 0.0, "size is taken before deletion");
    }
    assert_eq!(outcome.report.deleted_test_files.len(), 2);
}

#[test]
fn test_no_backup_folder_without_test_files() {
    let fixture = TestFixture::new();
    fixture.create_file("app.js", "app()");

    let outcome = run_cli(&RunOptions {
        delete: true,
        ..fixture.options()
    })
    .unwrap();

    assert!(outcome.backup_dir.is_none());
    assert!(!fixture.path().join("backup").exists());
    fixture.assert_file_exists("app.js");
}

#[test]
fn test_delete_and_organize_together() {
    let fixture = sample_workspace();

    let outcome = run_cli(&RunOptions {
        organize: true,
        delete: true,
        ..fixture.options()
    })
    .unwrap();

    assert_eq!(outcome.report.moved_files.len(), 5);
    assert_eq!(outcome.report.deleted_test_files.len(), 2);
    fixture.assert_file_not_exists("test_login.js");
    fixture.assert_file_exists("docs/INDEX.md");
}

// ============================================================================
// Test Suite 5: Configuration and Edge Cases
// ============================================================================

#[test]
fn test_missing_docs_folder_is_not_fatal() {
    let fixture = TestFixture::new();
    fixture.create_file("test_login.js", "login()");

    let outcome = run_cli(&RunOptions {
        organize: true,
        ..fixture.options()
    })
    .unwrap();

    assert!(outcome.report.organized_files.is_empty());
    assert!(outcome.index_path.is_none());
    assert!(outcome.report_path.is_file());
    fixture.assert_file_exists("test_login.js");
}

#[test]
fn test_workspace_config_changes_layout() {
    let fixture = TestFixture::new();
    fixture.create_file(
        ".tidydocsrc.toml",
        r#"
        [layout]
        docs_dir = "documentation"
        index_file = "CONTENTS.md"

        [docs.exclude]
        filenames = ["CHANGELOG.md"]
        "#,
    );
    fixture.create_file("documentation/README.md", "# Project");
    fixture.create_file("documentation/CHANGELOG.md", "changes");
    fixture.create_dir("docs");

    run_cli(&RunOptions {
        organize: true,
        ..fixture.options()
    })
    .unwrap();

    fixture.assert_file_exists("documentation/01-核心文档/README.md");
    fixture.assert_file_exists("documentation/CHANGELOG.md");
    fixture.assert_file_exists("documentation/CONTENTS.md");
    fixture.assert_file_not_exists("documentation/INDEX.md");
}

#[test]
fn test_invalid_explicit_config_is_reported() {
    let fixture = TestFixture::new();
    fixture.create_file("bad.toml", "[layout\n");
    fixture.create_file("docs/README.md", "# Project");

    let outcome = run_cli(&RunOptions {
        config: Some(fixture.path().join("bad.toml")),
        ..fixture.options()
    })
    .unwrap();

    let reports = fixture.report_files();
    assert_eq!(reports.len(), 1);
    let json = read_json(&reports[0]);
    assert_eq!(json["errors"].as_array().unwrap().len(), 1);
    assert!(
        json["errors"][0]
            .as_str()
            .unwrap()
            .starts_with("Error loading configuration")
    );
    // The run carried on with the default layout.
    assert_eq!(outcome.report.organized_files[0].total_root_files, 1);
}

#[test]
fn test_broken_workspace_config_falls_back_to_defaults() {
    let fixture = TestFixture::new();
    fixture.create_file(".tidydocsrc.toml", "[layout\n");
    fixture.create_file("docs/README.md", "# Project");
    fixture.create_file("test_login.js", "login()");
    let before = fixture.snapshot();

    let outcome = run_cli(&fixture.options()).unwrap();

    assert_eq!(fixture.snapshot(), before);
    let reports = fixture.report_files();
    assert_eq!(reports.len(), 1);
    let json = read_json(&reports[0]);
    assert_eq!(json["errors"].as_array().unwrap().len(), 1);
    assert_eq!(json["organized_files"][0]["total_root_files"], 1);
    assert_eq!(json["organized_files"][0]["categorized"]["01-核心文档"], 1);
}

#[test]
fn test_broken_workspace_config_still_organizes_and_deletes() {
    let fixture = TestFixture::new();
    fixture.create_file(".tidydocsrc.toml", "[docs.exclude]\nregex = [\"[\"]\n");
    fixture.create_file("docs/README.md", "# Project");
    fixture.create_file("test_login.js", "login()");

    let outcome = run_cli(&RunOptions {
        organize: true,
        delete: true,
        ..fixture.options()
    })
    .unwrap();

    assert_eq!(outcome.report.errors.len(), 1);
    fixture.assert_file_exists("docs/01-核心文档/README.md");
    fixture.assert_file_exists("docs/INDEX.md");
    fixture.assert_file_not_exists("test_login.js");
    assert_eq!(outcome.report.deleted_test_files.len(), 1);
    assert_eq!(fixture.report_files().len(), 1);
}
