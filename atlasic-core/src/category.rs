//! File categorization as an ordered rule table.
//!
//! Rules are evaluated top to bottom and the first match wins, so the order
//! is part of the contract: `src/components/Button.test.tsx` is a test, not a
//! component, and `src/api/config.ts` is config, not api.

use std::path::Path;

use crate::types::Category;

/// Lowercased name and directory facts a rule looks at.
#[derive(Debug, Clone)]
pub struct FileFacts {
    pub file_name: String,
    /// Directory relative to the workspace root, or absolute when the file
    /// lies outside it.
    pub dir: String,
}

impl FileFacts {
    pub fn new(path: &Path, workspace_root: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        let dir = parent
            .strip_prefix(workspace_root)
            .unwrap_or(parent)
            .to_string_lossy()
            .replace('\\', "/")
            .to_lowercase();

        Self { file_name, dir }
    }
}

/// One row of the rule table.
pub struct CategoryRule {
    pub category: Category,
    pub matches: fn(&FileFacts) -> bool,
}

/// The rule table, in evaluation order.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Test,
        matches: |f| {
            f.file_name.contains(".test.") || f.file_name.contains(".spec.") || f.dir.contains("test")
        },
    },
    CategoryRule {
        category: Category::Config,
        matches: |f| f.file_name.contains("config"),
    },
    CategoryRule {
        category: Category::Component,
        matches: |f| f.dir.contains("component") || f.file_name.contains("component"),
    },
    CategoryRule {
        category: Category::Api,
        matches: |f| f.dir.contains("api") || f.dir.contains("service"),
    },
    CategoryRule {
        category: Category::Utility,
        matches: |f| f.dir.contains("util") || f.dir.contains("helper"),
    },
    CategoryRule {
        category: Category::Model,
        matches: |f| f.dir.contains("model") || f.dir.contains("type"),
    },
];

/// Returns the category of the first matching rule, or `Other`.
pub fn categorize(path: &Path, workspace_root: &Path) -> Category {
    let facts = FileFacts::new(path, workspace_root);
    CATEGORY_RULES
        .iter()
        .find(|rule| (rule.matches)(&facts))
        .map(|rule| rule.category)
        .unwrap_or(Category::Other)
}
