//! Lexical import extraction, one scanner per language family.
//!
//! Scanners never fail. A specifier that cannot be resolved to an existing
//! file is dropped, so the returned list only holds paths that exist.

mod go;
mod java;
mod javascript;
mod python;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::alias::PathAliases;

pub use go::{extract_go, parse_go_module};
pub use java::extract_java;
pub use javascript::extract_javascript;
pub use python::extract_python;

/// Language families with an extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    Python,
    Java,
    Go,
}

impl Language {
    /// Maps a file extension to its scanner; `None` means no links.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "ts" | "tsx" | "js" | "jsx" => Some(Self::JavaScript),
            "py" => Some(Self::Python),
            "java" => Some(Self::Java),
            "go" => Some(Self::Go),
            _ => None,
        }
    }
}

/// Workspace-wide inputs every scanner may need.
#[derive(Debug, Clone, Default)]
pub struct ExtractContext {
    pub workspace_root: PathBuf,
    pub aliases: PathAliases,
    /// `module` path from the root `go.mod`, if any.
    pub go_module: Option<String>,
}

impl ExtractContext {
    pub fn new(workspace_root: impl Into<PathBuf>, aliases: PathAliases) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            aliases,
            go_module: None,
        }
    }

    pub fn with_go_module(mut self, module: impl Into<String>) -> Self {
        self.go_module = Some(module.into());
        self
    }

    /// Reads the alias config and `go.mod` under `workspace_root`.
    pub fn load(workspace_root: &Path) -> Self {
        let aliases = PathAliases::load(workspace_root);
        let go_module = fs::read_to_string(workspace_root.join("go.mod"))
            .ok()
            .and_then(|content| parse_go_module(&content));
        if let Some(module) = &go_module {
            debug!(module = %module, "found go module path");
        }

        Self {
            workspace_root: workspace_root.to_path_buf(),
            aliases,
            go_module,
        }
    }
}

/// Resolved import targets of `file`, one entry per import occurrence.
pub fn extract_dependencies(file: &Path, content: &str, ctx: &ExtractContext) -> Vec<PathBuf> {
    match Language::from_path(file) {
        Some(Language::JavaScript) => extract_javascript(file, content, ctx),
        Some(Language::Python) => extract_python(file, content, ctx),
        Some(Language::Java) => extract_java(content, ctx),
        Some(Language::Go) => extract_go(content, ctx),
        None => Vec::new(),
    }
}
