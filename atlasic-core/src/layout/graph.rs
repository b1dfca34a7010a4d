//! Index arena the simulation and renderer work on.
//!
//! Links are resolved from node ids to `usize` indices once, at
//! construction. A link naming an unknown node rejects the whole graph.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::error::{AtlasicError, AtlasicResult};
use crate::render::color::HeatScores;
use crate::types::{Category, CodebaseGraph};

use super::quadtree::Rect;

/// A node plus its runtime layout state.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    pub label: String,
    pub category: Category,
    pub language: String,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Pinned position, if any.
    pub fx: Option<f64>,
    pub fy: Option<f64>,
    pub in_degree: usize,
    pub heat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutEdge {
    pub source: usize,
    pub target: usize,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutGraph {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    index: HashMap<String, usize>,
    max_heat: f64,
}

impl LayoutGraph {
    /// Resolves every link endpoint to a node index and counts in-degrees.
    pub fn from_codebase(graph: &CodebaseGraph) -> AtlasicResult<Self> {
        let mut index = HashMap::with_capacity(graph.nodes.len());
        let mut nodes = Vec::with_capacity(graph.nodes.len());

        for (i, node) in graph.nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(AtlasicError::invalid_graph(format!(
                    "duplicate node id: {}",
                    node.id
                )));
            }
            nodes.push(LayoutNode {
                id: node.id.clone(),
                label: node.label.clone(),
                category: node.category,
                language: node.language.clone(),
                x: 0.0,
                y: 0.0,
                vx: 0.0,
                vy: 0.0,
                fx: None,
                fy: None,
                in_degree: 0,
                heat: 0.0,
            });
        }

        let mut edges = Vec::with_capacity(graph.links.len());
        for link in &graph.links {
            let resolve = |id: &str| {
                index.get(id).copied().ok_or_else(|| {
                    AtlasicError::invalid_graph(format!(
                        "link {} -> {} references unknown node {}",
                        link.source, link.target, id
                    ))
                })
            };
            let source = resolve(&link.source)?;
            let target = resolve(&link.target)?;
            nodes[target].in_degree += 1;
            edges.push(LayoutEdge { source, target });
        }

        Ok(Self {
            nodes,
            edges,
            index,
            max_heat: 0.0,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Largest in-degree, never below 1.
    pub fn max_in_degree(&self) -> usize {
        self.nodes.iter().map(|n| n.in_degree).max().unwrap_or(0).max(1)
    }

    pub fn max_heat(&self) -> f64 {
        self.max_heat
    }

    /// Copies scores onto nodes; ids without a score read as 0.
    pub fn apply_heat(&mut self, heat: &HeatScores) {
        for node in &mut self.nodes {
            node.heat = heat.score(&node.id);
        }
        self.max_heat = heat.max;
    }

    /// Places nodes on a golden-angle spiral around `(cx, cy)`.
    ///
    /// Deterministic, and spread by `max(1, sqrt(n / 100))` so large graphs
    /// do not start in one dense clump.
    pub fn place_phyllotaxis(&mut self, cx: f64, cy: f64) {
        let spread = (self.nodes.len() as f64 / 100.0).sqrt().max(1.0);
        let golden_angle = PI * (3.0 - 5f64.sqrt());
        for (i, node) in self.nodes.iter_mut().enumerate() {
            let radius = 10.0 * (0.5 + i as f64).sqrt() * spread;
            let angle = i as f64 * golden_angle;
            node.x = cx + radius * angle.cos();
            node.y = cy + radius * angle.sin();
            node.vx = 0.0;
            node.vy = 0.0;
        }
    }

    pub fn pin(&mut self, idx: usize, x: f64, y: f64) {
        if let Some(node) = self.nodes.get_mut(idx) {
            node.fx = Some(x);
            node.fy = Some(y);
        }
    }

    pub fn unpin(&mut self, idx: usize) {
        if let Some(node) = self.nodes.get_mut(idx) {
            node.fx = None;
            node.fy = None;
        }
    }

    pub fn positions(&self) -> Vec<(f64, f64)> {
        self.nodes.iter().map(|n| (n.x, n.y)).collect()
    }

    /// Bounding rectangle of all node positions.
    pub fn bounds(&self) -> Option<Rect> {
        Rect::bounding(self.nodes.iter().map(|n| (n.x, n.y)), 0.0)
    }

    /// Whether an edge touches `idx`.
    pub fn is_incident(&self, edge: &LayoutEdge, idx: usize) -> bool {
        edge.source == idx || edge.target == idx
    }
}
