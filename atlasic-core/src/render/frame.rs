//! Pure frame building: graph + camera + view state → draw commands.
//!
//! Commands are in world coordinates; [`Frame::transform`] maps them to the
//! screen. Anything entirely outside the padded viewport is culled, and the
//! level of detail follows [`RenderPolicy`].

use std::collections::HashSet;
use std::f64::consts::PI;

use serde::Serialize;

use crate::layout::{LayoutGraph, Rect, SizeTier, HIGHLIGHT_RADIUS, NODE_RADIUS};

use super::camera::Camera;
use super::color::{self, ColorScale, Rgba};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: Rgba,
    pub blur: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Rgba,
        width: f64,
    },
    /// Many segments stroked as one path.
    Lines {
        segments: Vec<[f64; 4]>,
        color: Rgba,
        width: f64,
    },
    Triangle {
        points: [(f64, f64); 3],
        fill: Rgba,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: Rgba,
        stroke: Rgba,
        stroke_width: f64,
        glow: Option<Glow>,
    },
    Square {
        x: f64,
        y: f64,
        size: f64,
        fill: Rgba,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        size: f64,
        color: Rgba,
    },
}

/// Everything a host needs to paint one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub background: Rgba,
    pub transform: Camera,
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

/// Level-of-detail thresholds for a size tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderPolicy {
    pub massive: bool,
    /// Labels appear above this zoom.
    pub label_min_zoom: f64,
    /// Arrowheads appear above this zoom unless massive.
    pub arrow_min_zoom: f64,
    /// Massive graphs draw squares below this zoom.
    pub square_below_zoom: f64,
    /// Cap on batched edges per frame.
    pub max_batched_edges: usize,
    pub viewport_padding: f64,
}

impl RenderPolicy {
    pub fn for_tier(tier: SizeTier) -> Self {
        let massive = tier.is_massive();
        Self {
            massive,
            label_min_zoom: if massive { 1.0 } else { 0.3 },
            arrow_min_zoom: 0.2,
            square_below_zoom: 0.5,
            max_batched_edges: 50_000,
            viewport_padding: 50.0,
        }
    }

    pub fn show_labels(&self, k: f64) -> bool {
        k > self.label_min_zoom
    }

    pub fn show_arrows(&self, k: f64) -> bool {
        k > self.arrow_min_zoom && !self.massive
    }

    pub fn simplified_nodes(&self, k: f64) -> bool {
        self.massive && k < self.square_below_zoom
    }

    pub fn batch_edges(&self, has_highlight: bool) -> bool {
        self.massive && !has_highlight
    }
}

/// Per-frame interaction state the renderer reads.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewState {
    pub width: f64,
    pub height: f64,
    pub highlighted: Option<usize>,
    pub hovered: Option<usize>,
}

fn outside_same_side(b: &Rect, sx: f64, sy: f64, tx: f64, ty: f64) -> bool {
    (sx < b.x && tx < b.x)
        || (sx > b.x + b.w && tx > b.x + b.w)
        || (sy < b.y && ty < b.y)
        || (sy > b.y + b.h && ty > b.y + b.h)
}

pub fn render_frame(
    graph: &LayoutGraph,
    camera: &Camera,
    view: &ViewState,
    policy: &RenderPolicy,
    colors: &ColorScale,
) -> Frame {
    let k = camera.k;
    let visible = camera.visible_world(view.width, view.height);
    let pad = policy.viewport_padding / k;
    let culling = Rect::new(visible.x - pad, visible.y - pad, visible.w + 2.0 * pad, visible.h + 2.0 * pad);

    let show_labels = policy.show_labels(k);
    let show_arrows = policy.show_arrows(k);
    let line_width = (1.0 / k).max(0.5);

    let mut commands = Vec::new();

    if policy.batch_edges(view.highlighted.is_some()) {
        let segments: Vec<[f64; 4]> = graph
            .edges
            .iter()
            .map(|e| (&graph.nodes[e.source], &graph.nodes[e.target]))
            .filter(|(s, t)| !outside_same_side(&culling, s.x, s.y, t.x, t.y))
            .take(policy.max_batched_edges)
            .map(|(s, t)| [s.x, s.y, t.x, t.y])
            .collect();
        if !segments.is_empty() {
            commands.push(DrawCommand::Lines {
                segments,
                color: color::EDGE_BATCHED,
                width: line_width,
            });
        }
    } else {
        let highlighted_edges: HashSet<usize> = match view.highlighted {
            Some(h) => graph
                .edges
                .iter()
                .enumerate()
                .filter(|(_, e)| graph.is_incident(e, h))
                .map(|(i, _)| i)
                .collect(),
            None => HashSet::new(),
        };

        for (i, edge) in graph.edges.iter().enumerate() {
            let s = &graph.nodes[edge.source];
            let t = &graph.nodes[edge.target];
            if outside_same_side(&culling, s.x, s.y, t.x, t.y) {
                continue;
            }
            let is_highlighted = highlighted_edges.contains(&i);
            let stroke = if is_highlighted { color::ACCENT } else { color::EDGE };

            let dx = t.x - s.x;
            let dy = t.y - s.y;
            let dist = (dx * dx + dy * dy).sqrt();
            let dist = if dist == 0.0 { 1.0 } else { dist };
            let gap = NODE_RADIUS + 2.0;
            let ex = t.x - dx / dist * gap;
            let ey = t.y - dy / dist * gap;

            commands.push(DrawCommand::Line {
                x1: s.x,
                y1: s.y,
                x2: ex,
                y2: ey,
                color: stroke,
                width: line_width,
            });

            if show_arrows || is_highlighted {
                let size = 8.0 / k;
                let angle = dy.atan2(dx);
                commands.push(DrawCommand::Triangle {
                    points: [
                        (ex, ey),
                        (ex - size * (angle - PI / 6.0).cos(), ey - size * (angle - PI / 6.0).sin()),
                        (ex - size * (angle + PI / 6.0).cos(), ey - size * (angle + PI / 6.0).sin()),
                    ],
                    fill: stroke,
                });
            }
        }
    }

    let in_view = |x: f64, y: f64| culling.contains_closed(x, y);

    if policy.simplified_nodes(k) {
        for node in graph.nodes.iter().filter(|n| in_view(n.x, n.y)) {
            commands.push(DrawCommand::Square {
                x: node.x - 2.0,
                y: node.y - 2.0,
                size: 4.0,
                fill: colors.node_color(node.category, node.in_degree, node.heat),
            });
        }
    } else {
        for (i, node) in graph.nodes.iter().enumerate() {
            if !in_view(node.x, node.y) {
                continue;
            }
            let is_highlighted = view.highlighted == Some(i);
            let is_hovered = view.hovered == Some(i);
            let glow = if is_highlighted {
                Some(Glow {
                    color: color::HIGHLIGHT_GLOW,
                    blur: 12.0 / k,
                })
            } else if is_hovered {
                Some(Glow {
                    color: color::HOVER_GLOW,
                    blur: 8.0 / k,
                })
            } else {
                None
            };

            commands.push(DrawCommand::Circle {
                cx: node.x,
                cy: node.y,
                r: if is_highlighted || is_hovered { HIGHLIGHT_RADIUS } else { NODE_RADIUS },
                fill: colors.node_color(node.category, node.in_degree, node.heat),
                stroke: if is_highlighted { color::ACCENT } else { color::WHITE },
                stroke_width: if is_highlighted { 3.0 / k } else { 1.5 / k },
                glow,
            });
        }
    }

    if show_labels {
        let size = (10.0 / k).max(10.0);
        for node in graph.nodes.iter().filter(|n| in_view(n.x, n.y)) {
            commands.push(DrawCommand::Text {
                x: node.x,
                y: node.y + 14.0,
                text: node.label.clone(),
                size,
                color: color::WHITE,
            });
        }
    }

    Frame {
        width: view.width,
        height: view.height,
        background: color::BACKGROUND,
        transform: *camera,
        commands,
    }
}
