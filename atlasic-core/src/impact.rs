//! Change impact analysis over the dependency graph.
//!
//! Given changed file paths, nodes are marked in three rings:
//! - level 0: the changed files themselves
//! - level 1: files that import a changed file
//! - level 2: files imported by a changed or level-1 file
//!
//! A node keeps the lowest level it qualifies for.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use serde::Serialize;

use crate::types::{CodebaseGraph, GraphNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Modified,
    Dependent,
    Dependency,
}

impl ImpactLevel {
    pub fn as_u8(&self) -> u8 {
        match self {
            ImpactLevel::Modified => 0,
            ImpactLevel::Dependent => 1,
            ImpactLevel::Dependency => 2,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            ImpactLevel::Modified => "Directly modified",
            ImpactLevel::Dependent => "Depends on modified file",
            ImpactLevel::Dependency => "Is depended on by modified file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactedNode {
    pub node: GraphNode,
    pub level: ImpactLevel,
    pub reason: &'static str,
}

/// Backslashes to `/`, lowercased.
fn normalize_for_match(path: &str) -> String {
    path.replace('\\', "/").to_lowercase()
}

/// Full or suffix match, or a changed path that ends with the node's basename.
fn path_matches(node_path: &str, changed: &str) -> bool {
    if node_path.ends_with(changed) {
        return true;
    }
    let base = Path::new(node_path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    !base.is_empty() && changed.ends_with(&base)
}

/// Marks affected nodes, ordered by level and then by graph node order.
pub fn detect_impact<S: AsRef<str>>(graph: &CodebaseGraph, changed_paths: &[S]) -> Vec<ImpactedNode> {
    let changed: Vec<String> = changed_paths
        .iter()
        .map(|p| normalize_for_match(p.as_ref().trim()))
        .filter(|p| !p.is_empty())
        .collect();
    if changed.is_empty() {
        return Vec::new();
    }

    let mut g: DiGraphMap<&str, ()> = DiGraphMap::new();
    for node in &graph.nodes {
        g.add_node(node.id.as_str());
    }
    for link in &graph.links {
        g.add_edge(link.source.as_str(), link.target.as_str(), ());
    }

    let mut levels: HashMap<&str, ImpactLevel> = HashMap::new();

    let modified: HashSet<&str> = graph
        .nodes
        .iter()
        .filter(|n| {
            let id = normalize_for_match(&n.id);
            changed.iter().any(|c| path_matches(&id, c))
        })
        .map(|n| n.id.as_str())
        .collect();
    for &id in &modified {
        levels.insert(id, ImpactLevel::Modified);
    }

    let mut dependents: HashSet<&str> = HashSet::new();
    for &id in &modified {
        for src in g.neighbors_directed(id, Direction::Incoming) {
            if !levels.contains_key(src) {
                dependents.insert(src);
            }
        }
    }
    for &id in &dependents {
        levels.insert(id, ImpactLevel::Dependent);
    }

    for &id in modified.iter().chain(dependents.iter()) {
        for dst in g.neighbors_directed(id, Direction::Outgoing) {
            levels.entry(dst).or_insert(ImpactLevel::Dependency);
        }
    }

    let mut impacted: Vec<(usize, ImpactedNode)> = graph
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(i, n)| {
            levels.get(n.id.as_str()).map(|&level| {
                (
                    i,
                    ImpactedNode {
                        node: n.clone(),
                        level,
                        reason: level.reason(),
                    },
                )
            })
        })
        .collect();
    impacted.sort_by_key(|(i, n)| (n.level, *i));
    impacted.into_iter().map(|(_, n)| n).collect()
}
