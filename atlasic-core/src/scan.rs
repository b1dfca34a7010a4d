//! Deterministic, depth-bounded file discovery with directory pruning.
//!
//! - Early directory pruning via `WalkDir::filter_entry` (ignored subtrees
//!   are never read)
//! - Entries sorted by file name, so discovery order is stable across runs
//! - Ignore patterns are case-insensitive substrings of the root-relative
//!   path, so `out` also prunes `layout.ts`

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::GeneratorOptions;
use crate::paths::relative_lowercase;

/// Walks a workspace and collects source files.
#[derive(Debug, Clone)]
pub struct FileDiscoverer {
    root: PathBuf,
    ignore_patterns: Vec<String>,
    max_depth: usize,
    extensions: Vec<String>,
}

impl FileDiscoverer {
    pub fn new(root: impl Into<PathBuf>, options: &GeneratorOptions) -> Self {
        Self {
            root: root.into(),
            ignore_patterns: options
                .ignore_patterns
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            max_depth: options.max_depth,
            extensions: options.extensions.iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    /// Checks a path against the ignore patterns.
    #[inline]
    pub fn is_ignored(&self, path: &Path) -> bool {
        let rel = relative_lowercase(&self.root, path);
        self.ignore_patterns.iter().any(|p| rel.contains(p.as_str()))
    }

    fn has_supported_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .is_some_and(|ext| self.extensions.contains(&ext))
    }

    /// Returns every supported file in discovery order.
    ///
    /// A file inside `k` nested directories is found only when
    /// `k <= max_depth`. Unreadable entries are logged and skipped.
    pub fn discover(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        // walkdir counts the root as depth 0 and its direct files as depth 1.
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .max_depth(self.max_depth.saturating_add(1))
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.is_ignored(e.path()));

        for entry in walker {
            match entry {
                Ok(e) => {
                    if e.file_type().is_file() && self.has_supported_extension(e.path()) {
                        files.push(e.into_path());
                    }
                }
                Err(e) => {
                    let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                    warn!(path = %path, error = %e, "error walking directory");
                }
            }
        }

        debug!(root = %self.root.display(), files = files.len(), "discovery complete");
        files
    }
}

/// Discovers source files under `root` with the given options.
pub fn discover_files(root: &Path, options: &GeneratorOptions) -> Vec<PathBuf> {
    FileDiscoverer::new(root, options).discover()
}
