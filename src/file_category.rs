//! Filename-based categorization of project documentation.
//!
//! Documents are sorted into a fixed set of numbered folders by looking for
//! keywords in their file names. Rules are evaluated in priority order and the
//! first rule that applies decides the category.
//!
//! # Examples
//!
//! ```
//! use tidydocs::file_category::{Category, DocClassifier};
//!
//! let classifier = DocClassifier::default();
//! assert_eq!(classifier.classify("README.md"), Category::CoreDocs);
//! assert_eq!(classifier.classify("用户反馈-优化建议.md"), Category::SecondaryFixReports);
//! assert_eq!(classifier.classify("notes.txt"), Category::CoreDocs);
//! ```

/// A destination folder for documentation.
///
/// Variants are declared in the same order as their folder names sort, so the
/// derived `Ord` matches a lexical sort of [`Category::dir_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Project overview, delivery and checklist documents.
    CoreDocs,
    /// Setup, deployment and quick-start guides.
    QuickStart,
    /// Bug fix and debugging write-ups.
    FixReports,
    /// Feature design and development reports.
    FeatureReports,
    /// Second fix-report folder; optimization write-ups land here.
    SecondaryFixReports,
    /// Product planning and project management notes.
    ProjectManagement,
    /// Test notes and developer tooling docs.
    DeveloperTools,
    /// Database scripts and schema notes.
    DatabaseScripts,
    /// Static resources.
    Resources,
    /// Staff work reports.
    StaffReports,
    /// Project manager work reports.
    ManagerReports,
}

impl Category {
    /// Returns the directory name for this category.
    ///
    /// Two pairs of categories share a numeric prefix (`05-` and `06-`); they
    /// are still separate folders.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidydocs::file_category::Category;
    ///
    /// assert_eq!(Category::CoreDocs.dir_name(), "01-核心文档");
    /// assert_eq!(Category::FixReports.dir_name(), "03-修复报告");
    /// assert_eq!(Category::SecondaryFixReports.dir_name(), "05-修复报告");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::CoreDocs => "01-核心文档",
            Category::QuickStart => "02-快速启动指南",
            Category::FixReports => "03-修复报告",
            Category::FeatureReports => "04-功能开发报告",
            Category::SecondaryFixReports => "05-修复报告",
            Category::ProjectManagement => "05-项目管理文档",
            Category::DeveloperTools => "06-开发者工具",
            Category::DatabaseScripts => "06-数据库脚本",
            Category::Resources => "07-资源文件",
            Category::StaffReports => "08-员工工作汇报",
            Category::ManagerReports => "09-项目经理工作汇报",
        }
    }

    /// Returns a human-readable description of this category.
    pub fn description(&self) -> &'static str {
        match self {
            Category::CoreDocs => "Core documentation",
            Category::QuickStart => "Quick-start guides",
            Category::FixReports => "Fix reports",
            Category::FeatureReports => "Feature development reports",
            Category::SecondaryFixReports => "Fix reports (optimization)",
            Category::ProjectManagement => "Project management docs",
            Category::DeveloperTools => "Developer tools",
            Category::DatabaseScripts => "Database scripts",
            Category::Resources => "Resources",
            Category::StaffReports => "Staff work reports",
            Category::ManagerReports => "Manager work reports",
        }
    }
}

/// How a matching rule turns a file name into a category.
#[derive(Clone, Copy)]
enum Resolution {
    /// The rule always yields this category.
    Always(Category),
    /// The rule looks at the lower-cased file name again to pick a category.
    Refine(fn(&str) -> Category),
}

/// One entry in the ordered rule list.
#[derive(Clone, Copy)]
struct Rule {
    name: &'static str,
    keywords: &'static [&'static str],
    resolution: Resolution,
}

/// Result of classifying a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// The chosen category.
    pub category: Category,
    /// Name of the rule that decided it (`"default"` when none matched).
    pub rule: &'static str,
}

const AI_KEYWORDS: &[&str] = &["AI", "Supabase", "供应商配置", "提示词", "生成示例", "发送数据"];
const ACTIVATION_KEYWORDS: &[&str] = &["激活码", "激活状态", "激活系统"];
const OPTIMIZATION_KEYWORDS: &[&str] = &[
    "优化",
    "改进",
    "浅色模式",
    "雷达图",
    "测评页面",
    "题库",
    "结果算法",
    "对比度",
];
const GUIDE_KEYWORDS: &[&str] = &["使用指南", "使用手册", "集成完成"];

/// The generic keyword table, checked after the special groups.
pub const CATEGORY_TABLE: &[(Category, &[&str])] = &[
    (
        Category::CoreDocs,
        &["README", "项目交付", "功能清单", "验收清单", "项目完成总结", "项目文件树"],
    ),
    (
        Category::QuickStart,
        &["快速开始", "快速测试", "开发启动", "部署", "快速"],
    ),
    (Category::FixReports, &["修复", "debug", "fix", "同步问题"]),
    (Category::FeatureReports, &["功能说明", "功能开发"]),
    (
        Category::SecondaryFixReports,
        &["修复报告", "修复步骤", "修复总结"],
    ),
    (Category::ProjectManagement, &["小红书", "MVP", "优化建议"]),
    (Category::DeveloperTools, &["测试", "test"]),
    (Category::DatabaseScripts, &["数据库", "MySQL", "SQL"]),
    (Category::Resources, &[]),
    (Category::StaffReports, &[]),
    (Category::ManagerReports, &[]),
];

fn contains_any(name: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| name.contains(term))
}

fn refine_ai(name: &str) -> Category {
    if name.contains("supabase") && contains_any(name, &["部署", "快速"]) {
        Category::QuickStart
    } else {
        Category::FeatureReports
    }
}

fn refine_activation(name: &str) -> Category {
    if contains_any(name, &["修复", "debug", "检查"]) {
        Category::FixReports
    } else if contains_any(name, &["测试", "test"]) {
        Category::DeveloperTools
    } else if name.contains("使用指南") {
        Category::QuickStart
    } else if contains_any(name, &["流程图", "逻辑"]) {
        Category::FeatureReports
    } else {
        Category::FixReports
    }
}

fn refine_guide(name: &str) -> Category {
    if name.contains("管理员") {
        Category::QuickStart
    } else {
        Category::FeatureReports
    }
}

const SPECIAL_RULES: &[Rule] = &[
    Rule {
        name: "ai",
        keywords: AI_KEYWORDS,
        resolution: Resolution::Refine(refine_ai),
    },
    Rule {
        name: "activation",
        keywords: ACTIVATION_KEYWORDS,
        resolution: Resolution::Refine(refine_activation),
    },
    Rule {
        name: "optimization",
        keywords: OPTIMIZATION_KEYWORDS,
        resolution: Resolution::Always(Category::SecondaryFixReports),
    },
    Rule {
        name: "guide",
        keywords: GUIDE_KEYWORDS,
        resolution: Resolution::Refine(refine_guide),
    },
];

const FALLBACK_RULES: &[Rule] = &[
    Rule {
        name: "test-prefix",
        keywords: &["test-", "test_"],
        resolution: Resolution::Always(Category::DeveloperTools),
    },
    Rule {
        name: "product",
        keywords: &["小红书", "mvp"],
        resolution: Resolution::Always(Category::ProjectManagement),
    },
    Rule {
        name: "quota",
        keywords: &["扣次数", "每日限制"],
        resolution: Resolution::Always(Category::FixReports),
    },
    Rule {
        name: "navigation",
        keywords: &["导航栏", "首页"],
        resolution: Resolution::Always(Category::FeatureReports),
    },
];

/// Compiled rule with its keywords already lower-cased.
#[derive(Clone)]
struct CompiledRule {
    name: &'static str,
    keywords: Vec<String>,
    resolution: Resolution,
}

impl CompiledRule {
    fn from_rule(rule: &Rule) -> Self {
        Self {
            name: rule.name,
            keywords: rule.keywords.iter().map(|k| k.to_lowercase()).collect(),
            resolution: rule.resolution,
        }
    }

    fn applies_to(&self, name: &str) -> bool {
        self.keywords.iter().any(|keyword| name.contains(keyword.as_str()))
    }

    fn resolve(&self, name: &str) -> Category {
        match self.resolution {
            Resolution::Always(category) => category,
            Resolution::Refine(refine) => refine(name),
        }
    }
}

/// Maps document file names to categories.
///
/// Holds the full rule list in evaluation order: special keyword groups,
/// then the generic table, then file-name fallbacks. Anything left over is
/// [`Category::CoreDocs`].
#[derive(Clone)]
pub struct DocClassifier {
    rules: Vec<CompiledRule>,
}

impl DocClassifier {
    /// Creates a classifier with the built-in rule list.
    pub fn new() -> Self {
        let generic = CATEGORY_TABLE.iter().map(|(category, keywords)| Rule {
            name: category.dir_name(),
            keywords: *keywords,
            resolution: Resolution::Always(*category),
        });

        let rules = SPECIAL_RULES
            .iter()
            .copied()
            .chain(generic)
            .chain(FALLBACK_RULES.iter().copied())
            .map(|rule| CompiledRule::from_rule(&rule))
            .collect();

        Self { rules }
    }

    /// Returns the category for a file name.
    pub fn classify(&self, file_name: &str) -> Category {
        self.explain(file_name).category
    }

    /// Returns the category for a file name along with the deciding rule.
    pub fn explain(&self, file_name: &str) -> Classification {
        let name = file_name.to_lowercase();

        self.rules
            .iter()
            .find(|rule| rule.applies_to(&name))
            .map(|rule| Classification {
                category: rule.resolve(&name),
                rule: rule.name,
            })
            .unwrap_or(Classification {
                category: Category::CoreDocs,
                rule: "default",
            })
    }
}

impl Default for DocClassifier {
    fn default() -> Self {
        Self::new()
    }
}
