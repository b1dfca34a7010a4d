//! Size tiers and the tunables derived from them.
//!
//! Larger graphs trade accuracy for frame rate: faster alpha decay, coarser
//! Barnes-Hut approximation, no collision pass, sampled links and a
//! rotating charge window.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeTier {
    /// ≤ 200 nodes
    Small,
    /// > 200 nodes
    Large,
    /// > 5,000 nodes
    Huge,
    /// > 20,000 nodes
    Massive,
}

impl SizeTier {
    pub fn from_node_count(nodes: usize) -> Self {
        match nodes {
            n if n > 20_000 => SizeTier::Massive,
            n if n > 5_000 => SizeTier::Huge,
            n if n > 200 => SizeTier::Large,
            _ => SizeTier::Small,
        }
    }

    pub fn is_massive(&self) -> bool {
        matches!(self, SizeTier::Massive)
    }
}

pub const NODE_RADIUS: f64 = 8.0;
pub const HIGHLIGHT_RADIUS: f64 = 12.0;
/// Hit-test radius in world units.
pub const HIT_RADIUS: f64 = 12.0;

/// Every physics and scheduling knob of a simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationConfig {
    pub tier: SizeTier,
    pub alpha_start: f64,
    pub alpha_decay: f64,
    pub alpha_min: f64,
    /// Alpha target while a node is dragged.
    pub drag_alpha: f64,
    pub link_distance: f64,
    pub link_strength: f64,
    pub charge_strength: f64,
    pub theta: f64,
    pub center_strength: f64,
    pub velocity_decay: f64,
    pub collision_radius: f64,
    pub collision_enabled: bool,
    /// Simulate only about this many links when the graph has more.
    pub link_sample_target: Option<usize>,
    /// Apply charge to this many nodes per tick, rotating through the list.
    pub charge_window: Option<usize>,
    /// Emit a frame every N loop iterations.
    pub render_every: u32,
    /// Rebuild the hit-test index every tick instead of on rendered frames.
    pub rebuild_index_every_tick: bool,
    pub index_capacity: usize,
}

impl SimulationConfig {
    pub fn for_graph(nodes: usize, links: usize) -> Self {
        let tier = SizeTier::from_node_count(nodes);
        let massive = tier.is_massive();

        let (alpha_decay, theta) = match tier {
            SizeTier::Small => (0.02, 0.9),
            SizeTier::Large => (0.05, 0.9),
            SizeTier::Huge => (0.08, 1.2),
            SizeTier::Massive => (0.15, 1.5),
        };

        Self {
            tier,
            alpha_start: if massive { 0.5 } else { 1.0 },
            alpha_decay,
            alpha_min: 0.001,
            drag_alpha: 0.3,
            link_distance: 80.0,
            link_strength: 0.5,
            charge_strength: -400.0,
            theta,
            center_strength: if massive { 0.005 } else { 0.01 },
            velocity_decay: if massive { 0.4 } else { 0.6 },
            collision_radius: 35.0,
            collision_enabled: !massive && nodes < 500,
            link_sample_target: (massive && links > 10_000).then_some(10_000),
            charge_window: massive.then_some(5_000),
            render_every: if massive { 3 } else { 1 },
            rebuild_index_every_tick: !massive,
            index_capacity: super::quadtree::DEFAULT_CAPACITY,
        }
    }
}
