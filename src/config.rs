//! Workspace layout, scan patterns and doc filtering configuration.
//!
//! Configuration is optional and stored as TOML. Every field has a default
//! that matches the conventional project layout, so an empty file (or no file
//! at all) gives the standard behaviour.
//!
//! ```toml
//! [layout]
//! docs_dir = "docs"
//! backup_dir = "backup"
//! index_file = "INDEX.md"
//!
//! [docs]
//! extensions = ["md", "html", "txt"]
//!
//! [docs.exclude]
//! filenames = ["CHANGELOG.md"]
//! patterns = ["draft-*"]
//! regex = []
//!
//! [tests]
//! patterns = ["test_*.js", "test-*.js", "test_*.ps1", "test-*.html"]
//!
//! [[tests.extra_roots]]
//! dir = "backend"
//! patterns = ["test_*.js", "test-*.js"]
//! ```

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-workspace configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".tidydocsrc.toml";

/// Per-user configuration file under a home directory.
pub fn user_config_path(home: &Path) -> PathBuf {
    home.join(".config").join("tidydocs").join("config.toml")
}

/// Errors that can occur during configuration loading and compilation.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HousekeepingConfig {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub docs: DocsConfig,
    #[serde(default)]
    pub tests: TestFilesConfig,
}

/// Where things live relative to the workspace root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Documentation root, relative to the workspace.
    pub docs_dir: String,
    /// Parent directory for per-run backup sets, relative to the workspace.
    pub backup_dir: String,
    /// Index file name, written inside the docs root.
    pub index_file: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            docs_dir: "docs".to_string(),
            backup_dir: "backup".to_string(),
            index_file: "INDEX.md".to_string(),
        }
    }
}

/// Which loose files under the docs root are eligible for sorting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Extensions (without the dot) of documents to sort.
    pub extensions: Vec<String>,
    /// Files to leave where they are.
    pub exclude: ExcludeRules,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_string(), "html".to_string(), "txt".to_string()],
            exclude: ExcludeRules::default(),
        }
    }
}

/// Rules for keeping documents out of the sort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude.
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the file name.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Glob patterns that identify throwaway test scripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestFilesConfig {
    /// Patterns applied to the workspace root.
    pub patterns: Vec<String>,
    /// Additional directories, scanned only when they exist.
    pub extra_roots: Vec<ExtraRoot>,
}

impl Default for TestFilesConfig {
    fn default() -> Self {
        Self {
            patterns: ["test_*.js", "test-*.js", "test_*.ps1", "test-*.html"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            extra_roots: vec![ExtraRoot {
                dir: "backend".to_string(),
                patterns: vec!["test_*.js".to_string(), "test-*.js".to_string()],
            }],
        }
    }
}

/// A secondary directory with its own test-file patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraRoot {
    /// Directory relative to the workspace.
    pub dir: String,
    /// Patterns applied inside that directory.
    pub patterns: Vec<String>,
}

impl HousekeepingConfig {
    /// Load configuration, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.tidydocsrc.toml` in the workspace root
    /// 3. Look for `~/.config/tidydocs/config.toml`
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read,
    /// or if any discovered file is not valid TOML.
    pub fn load(workspace: &Path, config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Self::load_with_home(workspace, config_path, home.as_deref())
    }

    /// Same as [`HousekeepingConfig::load`], with the home directory passed in.
    ///
    /// `home = None` skips the per-user file entirely.
    pub fn load_with_home(
        workspace: &Path,
        config_path: Option<&Path>,
        home: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = workspace.join(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(home) = home {
            let home_config = user_config_path(home);
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Validates patterns and builds the doc filter.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob pattern is invalid, including the
    /// test-file patterns.
    pub fn compile(&self) -> Result<DocFilter, ConfigError> {
        let test_patterns = self
            .tests
            .patterns
            .iter()
            .chain(self.tests.extra_roots.iter().flat_map(|r| r.patterns.iter()));
        for pattern in test_patterns {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))?;
        }

        DocFilter::new(&self.docs, &self.layout.index_file)
    }

    /// Absolute docs root for a workspace.
    pub fn docs_root(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.layout.docs_dir)
    }

    /// Absolute backup parent for a workspace.
    pub fn backup_root(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.layout.backup_dir)
    }
}

/// Compiled form of [`DocsConfig`], ready for matching file names.
pub struct DocFilter {
    extensions: HashSet<String>,
    index_file: String,
    exclude_filenames: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
}

impl DocFilter {
    fn new(docs: &DocsConfig, index_file: &str) -> Result<Self, ConfigError> {
        let exclude_patterns = docs
            .exclude
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = docs
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            extensions: docs
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            index_file: index_file.to_string(),
            exclude_filenames: docs.exclude.filenames.iter().cloned().collect(),
            exclude_patterns,
            exclude_regexes,
        })
    }

    /// Check if a loose file under the docs root should be sorted.
    ///
    /// Checks are performed in this order, with early termination:
    /// 1. The generated index is never sorted
    /// 2. Extension must be one of the configured document types
    /// 3. Exact filename, glob and regex excludes
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if file_name == self.index_file.as_str() {
            return false;
        }

        let extension = file_path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());
        match extension {
            Some(ext) if self.extensions.contains(&ext) => {}
            _ => return false,
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(&file_name))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }
}
