//! Builder pattern API for dependency graph generation.
//!
//! ```rust,ignore
//! use atlasic_core::prelude::*;
//!
//! let graph = GraphGenerator::new("/path/to/workspace")
//!     .with_max_depth(6)
//!     .with_extra_ignore(["fixtures"])
//!     .generate_graph()?;
//!
//! println!("{} files, {} imports", graph.nodes.len(), graph.links.len());
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::alias::PathAliases;
use crate::config::GeneratorOptions;
use crate::error::{AtlasicError, AtlasicResult};
use crate::extract::{extract_dependencies, ExtractContext};
use crate::paths::normalize;
use crate::scan::FileDiscoverer;
use crate::types::{CodebaseGraph, GraphLink, GraphNode};

/// Configures and runs one full graph build.
#[derive(Debug, Clone)]
pub struct GraphGenerator {
    /// Workspace root as given by the caller
    root: PathBuf,

    /// Discovery settings
    options: GeneratorOptions,

    /// Alias table override; loaded from the workspace when `None`
    aliases: Option<PathAliases>,
}

impl GraphGenerator {
    /// Create a generator for the given workspace root with default options.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            options: GeneratorOptions::default(),
            aliases: None,
        }
    }

    /// Replace all discovery options at once.
    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the maximum directory depth for discovery.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = depth;
        self
    }

    /// Append ignore patterns to the current list.
    pub fn with_extra_ignore<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options
            .ignore_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Use a fixed alias table instead of reading the workspace's config.
    pub fn with_aliases(mut self, aliases: PathAliases) -> Self {
        self.aliases = Some(aliases);
        self
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Root path of the workspace.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discovers, reads and scans every file, then merges in discovery order.
    ///
    /// Fails only when the root is missing or not a directory. Unreadable
    /// files keep their node and contribute no links.
    pub fn generate_graph(&self) -> AtlasicResult<CodebaseGraph> {
        if !self.root.exists() {
            return Err(AtlasicError::workspace(&self.root, "workspace root does not exist"));
        }
        if !self.root.is_dir() {
            return Err(AtlasicError::workspace(&self.root, "workspace root is not a directory"));
        }

        let root = normalize(&self.root.canonicalize().unwrap_or_else(|_| self.root.clone()));
        let mut ctx = ExtractContext::load(&root);
        if let Some(aliases) = &self.aliases {
            ctx.aliases = aliases.clone();
        }

        let files = FileDiscoverer::new(&root, &self.options).discover();
        info!(root = %root.display(), files = files.len(), aliases = ctx.aliases.len(), "generating graph");

        let scanned: Vec<(PathBuf, Vec<PathBuf>)> = files
            .into_par_iter()
            .map(|file| {
                let deps = match fs::read(&file) {
                    Ok(bytes) => {
                        let content = String::from_utf8_lossy(&bytes);
                        extract_dependencies(&file, &content, &ctx)
                    }
                    Err(e) => {
                        warn!(path = %file.display(), error = %e, "error processing file");
                        Vec::new()
                    }
                };
                (file, deps)
            })
            .collect();

        let graph = merge(&root, scanned);
        info!(nodes = graph.nodes.len(), links = graph.links.len(), "graph generated");
        Ok(graph)
    }
}

/// Sequential, order-preserving merge of per-file scan results.
fn merge(root: &Path, scanned: Vec<(PathBuf, Vec<PathBuf>)>) -> CodebaseGraph {
    let mut graph = CodebaseGraph::empty();
    let mut seen: HashSet<String> = HashSet::new();

    let mut add_node = |graph: &mut CodebaseGraph, path: &Path| -> String {
        let node = GraphNode::for_path(path, root);
        let id = node.id.clone();
        if seen.insert(id.clone()) {
            graph.nodes.push(node);
        }
        id
    };

    for (file, deps) in scanned {
        let source = add_node(&mut graph, &file);
        if !deps.is_empty() {
            debug!(file = %file.display(), links = deps.len(), "resolved imports");
        }
        for dep in deps {
            let target = add_node(&mut graph, &normalize(&dep));
            graph.links.push(GraphLink::dependency(source.clone(), target));
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_ws(name: &str) -> PathBuf {
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "atlasic_builder_{}_{}_{}",
            name,
            std::process::id(),
            id
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir.canonicalize().unwrap()
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_missing_root_is_workspace_error() {
        let missing = std::env::temp_dir().join("atlasic_builder_definitely_missing_root");
        let err = GraphGenerator::new(&missing).generate_graph().unwrap_err();
        assert!(matches!(err, AtlasicError::Workspace { .. }));
    }

    #[test]
    fn test_file_root_is_workspace_error() {
        let ws = temp_ws("fileroot");
        let file = ws.join("a.ts");
        write(&file, "");
        let err = GraphGenerator::new(&file).generate_graph().unwrap_err();
        assert!(matches!(err, AtlasicError::Workspace { .. }));
        fs::remove_dir_all(&ws).ok();
    }

    #[test]
    fn test_parallel_links_and_node_order() {
        let ws = temp_ws("order");
        write(&ws.join("a.ts"), "import './b';\nimport { x } from './b';\n");
        write(&ws.join("b.ts"), "export const x = 1;\n");

        let graph = GraphGenerator::new(&ws).generate_graph().unwrap();
        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        let a = ws.join("a.ts").to_string_lossy().to_string();
        let b = ws.join("b.ts").to_string_lossy().to_string();
        assert_eq!(ids, vec![a.as_str(), b.as_str()]);
        assert_eq!(graph.links.len(), 2);
        assert!(graph.links.iter().all(|l| l.source == a && l.target == b));
        fs::remove_dir_all(&ws).ok();
    }

    #[test]
    fn test_targets_outside_discovery_become_nodes() {
        let ws = temp_ws("outside");
        write(&ws.join("src/a.ts"), "import '../vendor/lib';\n");
        write(&ws.join("vendor/lib.js"), "");

        let graph = GraphGenerator::new(&ws)
            .with_extra_ignore(["vendor"])
            .generate_graph()
            .unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[1].label, "lib.js");
        assert_eq!(graph.links.len(), 1);
        fs::remove_dir_all(&ws).ok();
    }

    #[test]
    fn test_alias_override() {
        let ws = temp_ws("aliasov");
        write(&ws.join("app/main.ts"), "import { f } from '@/lib/f';\n");
        write(&ws.join("shared/lib/f.ts"), "");

        let aliases = PathAliases::new(vec![("@".to_string(), ws.join("shared"))]);
        let graph = GraphGenerator::new(&ws)
            .with_aliases(aliases)
            .generate_graph()
            .unwrap();
        assert_eq!(graph.links.len(), 1);
        assert!(graph.links[0].target.ends_with("f.ts"));
        fs::remove_dir_all(&ws).ok();
    }
}
