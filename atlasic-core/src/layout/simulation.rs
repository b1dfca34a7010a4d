//! Force-directed integrator.
//!
//! One [`Simulation::tick`] applies link springs, Barnes-Hut repulsion,
//! centering and (for small graphs) pairwise collision, then integrates
//! velocities. `alpha` scales every force and decays toward
//! `alpha_target`; once it drops below `alpha_min` it snaps to 0 and ticks
//! stop moving anything.

use sha2::{Digest, Sha256};
use tracing::debug;

use super::barnes_hut::BarnesHutTree;
use super::graph::LayoutGraph;
use super::tier::SimulationConfig;

#[derive(Debug, Clone)]
pub struct Simulation {
    pub config: SimulationConfig,
    alpha: f64,
    alpha_target: f64,
    center: (f64, f64),
    /// Edge indices that receive spring forces.
    simulated_edges: Vec<usize>,
    charge_offset: usize,
    ticks: u64,
}

/// Deterministic pseudo-random fraction in `[0, 1)` for an index.
fn unit_hash(i: usize) -> f64 {
    let digest = Sha256::digest((i as u64).to_le_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    (u64::from_le_bytes(bytes) >> 11) as f64 / (1u64 << 53) as f64
}

/// Keeps about `target` of `count` edges, chosen by hash.
pub fn sample_edges(count: usize, target: usize) -> Vec<usize> {
    if count <= target {
        return (0..count).collect();
    }
    let rate = target as f64 / count as f64;
    (0..count).filter(|&i| unit_hash(i) < rate).collect()
}

impl Simulation {
    /// Derives the config from the graph size and centers on the viewport.
    pub fn new(graph: &LayoutGraph, width: f64, height: f64) -> Self {
        let config = SimulationConfig::for_graph(graph.nodes.len(), graph.edges.len());
        Self::with_config(graph, config, width, height)
    }

    pub fn with_config(graph: &LayoutGraph, config: SimulationConfig, width: f64, height: f64) -> Self {
        let simulated_edges = match config.link_sample_target {
            Some(target) => sample_edges(graph.edges.len(), target),
            None => (0..graph.edges.len()).collect(),
        };
        if simulated_edges.len() < graph.edges.len() {
            debug!(
                sampled = simulated_edges.len(),
                total = graph.edges.len(),
                "sampled links for simulation"
            );
        }

        Self {
            alpha: config.alpha_start,
            alpha_target: 0.0,
            center: (width / 2.0, height / 2.0),
            simulated_edges,
            charge_offset: 0,
            ticks: 0,
            config,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn is_settled(&self) -> bool {
        self.alpha == 0.0
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn simulated_edge_count(&self) -> usize {
        self.simulated_edges.len()
    }

    pub fn center(&self) -> (f64, f64) {
        self.center
    }

    /// Moves the centering target to the middle of a `width × height` view.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.center = (width / 2.0, height / 2.0);
    }

    /// Keeps the simulation warm while a node is dragged.
    pub fn start_drag(&mut self) {
        self.alpha_target = self.config.drag_alpha;
        self.alpha = self.alpha.max(self.config.drag_alpha);
    }

    pub fn end_drag(&mut self) {
        self.alpha_target = 0.0;
    }

    /// Restarts motion from `alpha` (e.g. after heat or resize changes).
    pub fn reheat(&mut self, alpha: f64) {
        self.alpha = self.alpha.max(alpha);
    }

    /// Advances one step. Returns false when alpha is (or just became) 0.
    pub fn tick(&mut self, graph: &mut LayoutGraph) -> bool {
        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        if self.alpha < self.config.alpha_min {
            self.alpha = 0.0;
            return false;
        }
        self.ticks += 1;

        let alpha = self.alpha;
        self.apply_links(graph, alpha);
        self.apply_charge(graph, alpha);
        self.apply_centering(graph, alpha);
        if self.config.collision_enabled {
            self.apply_collision(graph, alpha);
        }
        self.integrate(graph);
        true
    }

    /// Ticks until settled or `max_ticks` is reached; returns ticks run.
    pub fn run(&mut self, graph: &mut LayoutGraph, max_ticks: usize) -> usize {
        let mut n = 0;
        while n < max_ticks && self.tick(graph) {
            n += 1;
        }
        n
    }

    fn apply_links(&self, graph: &mut LayoutGraph, alpha: f64) {
        let c = &self.config;
        for &e in &self.simulated_edges {
            let edge = graph.edges[e];
            let (sx, sy) = (graph.nodes[edge.source].x, graph.nodes[edge.source].y);
            let (tx, ty) = (graph.nodes[edge.target].x, graph.nodes[edge.target].y);
            let dx = tx - sx;
            let dy = ty - sy;
            let dist = nonzero((dx * dx + dy * dy).sqrt());
            let force = (dist - c.link_distance) * c.link_strength * alpha;
            let fx = dx / dist * force;
            let fy = dy / dist * force;

            let target = &mut graph.nodes[edge.target];
            target.vx -= fx;
            target.vy -= fy;
            let source = &mut graph.nodes[edge.source];
            source.vx += fx;
            source.vy += fy;
        }
    }

    fn apply_charge(&mut self, graph: &mut LayoutGraph, alpha: f64) {
        let n = graph.nodes.len();
        if n == 0 {
            return;
        }
        let positions = graph.positions();
        let tree = BarnesHutTree::build(&positions);
        let strength = self.config.charge_strength * alpha;
        let theta = self.config.theta;

        let (start, count) = match self.config.charge_window {
            Some(window) if window < n => {
                let start = self.charge_offset % n;
                self.charge_offset = (start + window) % n;
                (start, window)
            }
            _ => (0, n),
        };

        for k in 0..count {
            let i = (start + k) % n;
            let (x, y) = positions[i];
            let (fx, fy) = tree.force_on(i, x, y, theta, strength);
            graph.nodes[i].vx += fx;
            graph.nodes[i].vy += fy;
        }
    }

    fn apply_centering(&self, graph: &mut LayoutGraph, alpha: f64) {
        let (cx, cy) = self.center;
        let k = self.config.center_strength * alpha;
        for node in &mut graph.nodes {
            node.vx += (cx - node.x) * k;
            node.vy += (cy - node.y) * k;
        }
    }

    fn apply_collision(&self, graph: &mut LayoutGraph, alpha: f64) {
        let min_dist = self.config.collision_radius * 2.0;
        let n = graph.nodes.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = graph.nodes[j].x - graph.nodes[i].x;
                let dy = graph.nodes[j].y - graph.nodes[i].y;
                let dist = nonzero((dx * dx + dy * dy).sqrt());
                if dist < min_dist {
                    let force = (min_dist - dist) * 0.5 * alpha;
                    let fx = dx / dist * force;
                    let fy = dy / dist * force;
                    graph.nodes[i].vx -= fx;
                    graph.nodes[i].vy -= fy;
                    graph.nodes[j].vx += fx;
                    graph.nodes[j].vy += fy;
                }
            }
        }
    }

    fn integrate(&self, graph: &mut LayoutGraph) {
        let decay = self.config.velocity_decay;
        for node in &mut graph.nodes {
            match node.fx {
                Some(fx) => {
                    node.x = fx;
                    node.vx = 0.0;
                }
                None => {
                    node.vx *= decay;
                    node.x += node.vx;
                }
            }
            match node.fy {
                Some(fy) => {
                    node.y = fy;
                    node.vy = 0.0;
                }
                None => {
                    node.vy *= decay;
                    node.y += node.vy;
                }
            }
        }
    }
}

/// Zero distance counts as 1 so directions stay finite.
#[inline]
fn nonzero(d: f64) -> f64 {
    if d == 0.0 {
        1.0
    } else {
        d
    }
}
