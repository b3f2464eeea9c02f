//! Markdown index of the docs tree.
//!
//! Building the index is split in two: [`DocsTree::read`] snapshots what is on
//! disk and [`render_index`] turns a snapshot into markdown. Neither moves or
//! deletes anything.

use crate::report::ReportError;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// One subdirectory of the docs root and the files directly inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedDir {
    pub name: String,
    pub files: Vec<String>,
}

/// What the docs root looked like when it was read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocsTree {
    /// Subdirectories, sorted by name.
    pub dirs: Vec<IndexedDir>,
    /// Files at the root, sorted, without the index itself.
    pub root_files: Vec<String>,
}

impl DocsTree {
    /// Reads the docs root. Returns `None` if it does not exist.
    pub fn read(docs_root: &Path, index_file: &str) -> Option<Self> {
        let entries = fs::read_dir(docs_root).ok()?;

        let mut tree = DocsTree::default();
        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();

            if path.is_dir() {
                tree.dirs.push(IndexedDir {
                    files: list_files(&path),
                    name,
                });
            } else if path.is_file() && name != index_file {
                tree.root_files.push(name);
            }
        }

        tree.dirs.sort_by(|a, b| a.name.cmp(&b.name));
        tree.root_files.sort();
        Some(tree)
    }

    /// Number of files across every section.
    pub fn total_files(&self) -> usize {
        self.dirs.iter().map(|d| d.files.len()).sum::<usize>() + self.root_files.len()
    }
}

fn list_files(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .filter(|e| e.path().is_file())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}

/// Marker shown in front of a file, chosen by extension.
pub fn file_icon(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());

    match extension.as_deref() {
        Some("md") => "📝",
        Some("html") => "🌐",
        Some("txt") => "📄",
        Some("sql") => "🗄️",
        _ => "📎",
    }
}

/// Link target for a file.
///
/// Characters that end or split a markdown link destination are
/// percent-encoded. Everything else, CJK included, is left as is.
fn link(parts: &[&str]) -> String {
    let mut target = String::from("./");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            target.push('/');
        }
        for c in part.chars() {
            match c {
                '%' => target.push_str("%25"),
                ' ' => target.push_str("%20"),
                '#' => target.push_str("%23"),
                '(' => target.push_str("%28"),
                ')' => target.push_str("%29"),
                '<' => target.push_str("%3C"),
                '>' => target.push_str("%3E"),
                '[' => target.push_str("%5B"),
                ']' => target.push_str("%5D"),
                _ => target.push(c),
            }
        }
    }
    target
}

/// Renders a tree snapshot as markdown.
pub fn render_index(tree: &DocsTree, generated_at: DateTime<Local>) -> String {
    let mut out = String::new();
    out.push_str("# Documentation Index\n\n");
    out.push_str(&format!(
        "> Generated: {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str("## 📁 Directory layout\n\n");

    for dir in &tree.dirs {
        out.push_str(&format!("\n### 📂 {} ({} files)\n\n", dir.name, dir.files.len()));
        if dir.files.is_empty() {
            out.push_str("*(no files yet)*\n");
        }
        for file in &dir.files {
            out.push_str(&format!(
                "- {} [{}]({})\n",
                file_icon(file),
                file,
                link(&[dir.name.as_str(), file.as_str()])
            ));
        }
    }

    if !tree.root_files.is_empty() {
        out.push_str(&format!(
            "\n### 📄 Root documents ({} files)\n\n",
            tree.root_files.len()
        ));
        for file in &tree.root_files {
            out.push_str(&format!("- {} [{}]({})\n", file_icon(file), file, link(&[file.as_str()])));
        }
    }

    out.push_str(&format!(
        "\n---\n\n**📊 Totals**: {} directories, {} files\n",
        tree.dirs.len(),
        tree.total_files()
    ));
    out
}

/// Reads `docs_root`, renders the index and writes it to `docs_root/index_file`.
///
/// Returns `Ok(None)` when the docs root does not exist.
pub fn write_index(
    docs_root: &Path,
    index_file: &str,
    generated_at: DateTime<Local>,
) -> Result<Option<(PathBuf, DocsTree)>, ReportError> {
    let Some(tree) = DocsTree::read(docs_root, index_file) else {
        return Ok(None);
    };

    let path = docs_root.join(index_file);
    fs::write(&path, render_index(&tree, generated_at)).map_err(|source| ReportError::Write {
        path: path.clone(),
        source,
    })?;

    Ok(Some((path, tree)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_icons() {
        assert_eq!(file_icon("a.md"), "📝");
        assert_eq!(file_icon("a.HTML"), "🌐");
        assert_eq!(file_icon("a.txt"), "📄");
        assert_eq!(file_icon("a.sql"), "🗄️");
        assert_eq!(file_icon("a.png"), "📎");
        assert_eq!(file_icon("Makefile"), "📎");
    }

    #[test]
    fn test_render_sections_in_order() {
        let tree = DocsTree {
            dirs: vec![
                IndexedDir {
                    name: "01-核心文档".to_string(),
                    files: vec!["README.md".to_string()],
                },
                IndexedDir {
                    name: "07-资源文件".to_string(),
                    files: vec![],
                },
            ],
            root_files: vec!["loose.html".to_string()],
        };

        let text = render_index(&tree, Local::now());

        let core = text.find("### 📂 01-核心文档 (1 files)").unwrap();
        let resources = text.find("### 📂 07-资源文件 (0 files)").unwrap();
        let root = text.find("### 📄 Root documents (1 files)").unwrap();
        assert!(core < resources && resources < root);
        assert!(text.contains("- 📝 [README.md](./01-核心文档/README.md)"));
        assert!(text.contains("*(no files yet)*"));
        assert!(text.contains("- 🌐 [loose.html](./loose.html)"));
        assert!(text.contains("**📊 Totals**: 2 directories, 2 files"));
    }

    #[test]
    fn test_link_encodes_spaces() {
        assert_eq!(link(&["a b", "c d.md"]), "./a%20b/c%20d.md");
    }

    #[test]
    fn test_link_encodes_markdown_delimiters() {
        assert_eq!(
            link(&["03-修复报告", "登录修复(v2) #3.md"]),
            "./03-修复报告/登录修复%28v2%29%20%233.md"
        );
        assert_eq!(link(&["100%.md"]), "./100%25.md");
        assert_eq!(link(&["[draft]<1>.md"]), "./%5Bdraft%5D%3C1%3E.md");
    }

    #[test]
    fn test_render_keeps_link_intact_for_parenthesised_name() {
        let tree = DocsTree {
            dirs: vec![],
            root_files: vec!["notes (old).md".to_string()],
        };

        let text = render_index(&tree, Local::now());

        assert!(text.contains("- 📝 [notes (old).md](./notes%20%28old%29.md)\n"));
    }

    #[test]
    fn test_write_index_reads_disk_and_skips_itself() {
        let temp_dir = TempDir::new().unwrap();
        let docs = temp_dir.path().join("docs");
        fs::create_dir_all(docs.join("06-数据库脚本")).unwrap();
        fs::write(docs.join("06-数据库脚本").join("init.sql"), "--").unwrap();
        fs::write(docs.join("INDEX.md"), "stale").unwrap();

        let (path, tree) = write_index(&docs, "INDEX.md", Local::now())
            .unwrap()
            .expect("docs root exists");

        assert!(tree.root_files.is_empty());
        assert_eq!(tree.total_files(), 1);
        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("- 🗄️ [init.sql](./06-数据库脚本/init.sql)"));
        assert!(!text.contains("stale"));
    }

    #[test]
    fn test_write_index_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let result = write_index(&temp_dir.path().join("docs"), "INDEX.md", Local::now()).unwrap();
        assert!(result.is_none());
    }
}
