//! Force-directed layout: index arena, spatial indices, size tiers and the
//! physics integrator.

pub mod barnes_hut;
pub mod graph;
pub mod quadtree;
pub mod simulation;
pub mod tier;

pub use barnes_hut::BarnesHutTree;
pub use graph::{LayoutEdge, LayoutGraph, LayoutNode};
pub use quadtree::{QuadPoint, Quadtree, Rect};
pub use simulation::{sample_edges, Simulation};
pub use tier::{SimulationConfig, SizeTier, HIGHLIGHT_RADIUS, HIT_RADIUS, NODE_RADIUS};

/// Builds the hit-test index over current node positions.
pub fn build_hit_index(graph: &LayoutGraph, capacity: usize) -> Quadtree<usize> {
    Quadtree::build(
        graph.nodes.iter().enumerate().map(|(i, n)| (n.x, n.y, i)),
        capacity,
    )
}
