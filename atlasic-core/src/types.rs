//! Persisted graph model: nodes keyed by absolute path, one link per import.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::category::categorize;

/// Coarse role of a file, derived from its name and directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Component,
    Utility,
    Api,
    Test,
    Config,
    Model,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Component => "component",
            Category::Utility => "utility",
            Category::Api => "api",
            Category::Test => "test",
            Category::Config => "config",
            Category::Model => "model",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source file in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Absolute file path; unique key.
    pub id: String,
    /// File basename.
    pub label: String,
    pub category: Category,
    /// Extension without the leading dot (empty when the file has none).
    pub language: String,
}

impl GraphNode {
    /// Creates the node for `path`, categorizing relative to `workspace_root`.
    pub fn for_path(path: &Path, workspace_root: &Path) -> Self {
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let language = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            id: path.to_string_lossy().to_string(),
            label,
            category: categorize(path, workspace_root),
            language,
        }
    }
}

/// Kind of relationship a link records. Only imports are detected today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    #[default]
    Dependency,
}

/// One detected import statement, from the importing file to the imported one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default)]
    pub kind: LinkKind,
}

impl GraphLink {
    pub fn dependency(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: LinkKind::Dependency,
        }
    }
}

/// The full dependency graph of a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodebaseGraph {
    /// Insertion order is discovery order.
    pub nodes: Vec<GraphNode>,
    /// Parallel links are kept: one per import occurrence.
    pub links: Vec<GraphLink>,
    /// Creation instant, Unix milliseconds.
    pub timestamp: i64,
}

impl CodebaseGraph {
    /// An empty graph stamped with the current time.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// SHA-256 over node ids and link endpoints, ignoring the timestamp.
    ///
    /// Two builds of an unchanged tree produce the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut sha = Sha256::new();
        for node in &self.nodes {
            sha.update(node.id.as_bytes());
            sha.update([0u8]);
        }
        sha.update([0xffu8]);
        for link in &self.links {
            sha.update(link.source.as_bytes());
            sha.update([0u8]);
            sha.update(link.target.as_bytes());
            sha.update([0u8]);
        }
        format!("{:x}", sha.finalize())
    }
}

impl Default for CodebaseGraph {
    fn default() -> Self {
        Self::empty()
    }
}
