//! Interactive graph view driven by an injected frame clock.
//!
//! [`GraphView`] owns the layout arena, the simulation, the hit-test index
//! and the camera. A host forwards pointer, keyboard and resize events to it
//! and calls [`GraphView::frame`] once per animation frame; side effects the
//! host must act on are queued as [`HostSignal`]s.

pub mod interaction;
pub mod search;

use std::path::PathBuf;

use tracing::debug;

use crate::error::{AtlasicError, AtlasicResult};
use crate::layout::{build_hit_index, LayoutGraph, Quadtree, Simulation, HIT_RADIUS};
use crate::render::camera::{Camera, CameraAnimation, FOCUS_SCALE};
use crate::render::color::{ColorMode, ColorScale, HeatScores};
use crate::render::frame::{render_frame, Frame, RenderPolicy, ViewState};
use crate::types::CodebaseGraph;

pub use interaction::{ClickKind, ClickTracker, Cursor, Interaction, Tooltip, DRAG_THRESHOLD_PX};
pub use search::{SearchKey, SearchState, Suggestion};

/// Margin in pixels kept around the graph by [`GraphView::fit_to_content`].
const FIT_MARGIN: f64 = 40.0;

/// Requests for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSignal {
    /// Open this file in the editor (double click).
    OpenFile(PathBuf),
    /// The view holds a graph of this size.
    GraphReady { nodes: usize, links: usize },
}

pub struct GraphView {
    graph: LayoutGraph,
    simulation: Simulation,
    hit_index: Quadtree<usize>,
    policy: RenderPolicy,
    camera: Camera,
    animation: Option<CameraAnimation>,
    color_mode: ColorMode,
    width: f64,
    height: f64,
    interaction: Interaction,
    /// Screen position of the last pointer-down, for drag detection.
    press_origin: (f64, f64),
    /// Set once a press moved past the drag threshold; the click that
    /// follows such a press is swallowed.
    suppress_click: bool,
    hovered: Option<usize>,
    highlighted: Option<usize>,
    clicks: ClickTracker,
    search: SearchState,
    signals: Vec<HostSignal>,
    frame_count: u64,
    closed: bool,
}

impl GraphView {
    /// Resolves `graph` into a layout and seeds positions around the
    /// viewport center.
    pub fn new(graph: &CodebaseGraph, width: f64, height: f64) -> AtlasicResult<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(AtlasicError::invalid_argument(format!(
                "viewport must be positive, got {}x{}",
                width, height
            )));
        }
        let mut layout = LayoutGraph::from_codebase(graph)?;
        layout.place_phyllotaxis(width / 2.0, height / 2.0);
        let simulation = Simulation::new(&layout, width, height);
        let hit_index = build_hit_index(&layout, simulation.config.index_capacity);
        let policy = RenderPolicy::for_tier(simulation.config.tier);

        debug!(
            nodes = layout.nodes.len(),
            edges = layout.edges.len(),
            tier = ?simulation.config.tier,
            "graph view ready"
        );

        Ok(Self {
            signals: vec![HostSignal::GraphReady {
                nodes: layout.nodes.len(),
                links: layout.edges.len(),
            }],
            graph: layout,
            simulation,
            hit_index,
            policy,
            camera: Camera::default(),
            animation: None,
            color_mode: ColorMode::default(),
            width,
            height,
            interaction: Interaction::Idle,
            press_origin: (0.0, 0.0),
            suppress_click: false,
            hovered: None,
            highlighted: None,
            clicks: ClickTracker::default(),
            search: SearchState::default(),
            frame_count: 0,
            closed: false,
        })
    }

    pub fn graph(&self) -> &LayoutGraph {
        &self.graph
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn policy(&self) -> &RenderPolicy {
        &self.policy
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Advances one animation frame.
    ///
    /// Returns `None` after [`close`](Self::close) and on frames skipped by
    /// the tier's frame-skip policy. A settled layout renders every frame.
    pub fn frame(&mut self, now_ms: f64) -> Option<Frame> {
        if self.closed {
            return None;
        }
        self.frame_count += 1;

        let moved = !self.simulation.is_settled() && self.simulation.tick(&mut self.graph);
        let render = self.simulation.is_settled()
            || self.frame_count % u64::from(self.simulation.config.render_every.max(1)) == 0;

        if moved && (self.simulation.config.rebuild_index_every_tick || render) {
            self.rebuild_hit_index();
        }

        if let Some(animation) = self.animation {
            let (camera, done) = animation.sample(now_ms);
            self.camera = camera;
            if done {
                self.animation = None;
            }
        }

        self.search.poll(&self.graph, now_ms);

        render.then(|| self.render())
    }

    /// Builds a frame for the current state without advancing anything.
    pub fn render(&self) -> Frame {
        let view = ViewState {
            width: self.width,
            height: self.height,
            highlighted: self.highlighted,
            hovered: self.hovered,
        };
        let colors = ColorScale {
            mode: self.color_mode,
            max_in_degree: self.graph.max_in_degree() as f64,
            max_heat: self.graph.max_heat(),
        };
        render_frame(&self.graph, &self.camera, &view, &self.policy, &colors)
    }

    /// Runs the simulation to rest (or `max_ticks`) without rendering.
    pub fn settle(&mut self, max_ticks: usize) -> usize {
        let ticks = self.simulation.run(&mut self.graph, max_ticks);
        self.rebuild_hit_index();
        ticks
    }

    /// Frames the whole graph in the viewport.
    pub fn fit_to_content(&mut self) {
        if let Some(bounds) = self.graph.bounds() {
            self.animation = None;
            self.camera = Camera::fit_to(bounds, self.width, self.height, FIT_MARGIN);
        }
    }

    fn rebuild_hit_index(&mut self) {
        self.hit_index = build_hit_index(&self.graph, self.simulation.config.index_capacity);
    }

    /// Node under a screen position, if any.
    pub fn node_at(&self, sx: f64, sy: f64) -> Option<usize> {
        let (wx, wy) = self.camera.screen_to_world(sx, sy);
        self.hit_index.find_nearest(wx, wy, HIT_RADIUS).copied()
    }

    pub fn pointer_down(&mut self, sx: f64, sy: f64) {
        self.animation = None;
        self.press_origin = (sx, sy);
        self.suppress_click = false;

        match self.node_at(sx, sy) {
            Some(idx) => {
                let (x, y) = (self.graph.nodes[idx].x, self.graph.nodes[idx].y);
                self.graph.pin(idx, x, y);
                self.simulation.start_drag();
                self.interaction = Interaction::DraggingNode(idx);
            }
            None => {
                self.interaction = Interaction::Panning { last: (sx, sy) };
            }
        }
    }

    pub fn pointer_move(&mut self, sx: f64, sy: f64) {
        let (ox, oy) = self.press_origin;
        let past_threshold = (sx - ox).hypot(sy - oy) > DRAG_THRESHOLD_PX;

        match self.interaction {
            Interaction::DraggingNode(idx) => {
                if past_threshold {
                    self.suppress_click = true;
                }
                let (wx, wy) = self.camera.screen_to_world(sx, sy);
                self.graph.pin(idx, wx, wy);
                let node = &mut self.graph.nodes[idx];
                node.x = wx;
                node.y = wy;
            }
            Interaction::Panning { last } => {
                if past_threshold {
                    self.suppress_click = true;
                }
                self.camera.pan(sx - last.0, sy - last.1);
                self.interaction = Interaction::Panning { last: (sx, sy) };
            }
            Interaction::Idle => {
                self.hovered = self.node_at(sx, sy);
            }
        }
    }

    pub fn pointer_up(&mut self) {
        if let Interaction::DraggingNode(idx) = self.interaction {
            self.graph.unpin(idx);
            self.simulation.end_drag();
            self.rebuild_hit_index();
        }
        self.interaction = Interaction::Idle;
    }

    /// Pointer left the canvas: ends any gesture and clears hover.
    pub fn pointer_leave(&mut self) {
        self.pointer_up();
        self.hovered = None;
    }

    /// Click at a screen position. The first click on a node highlights it
    /// and animates the camera to it; a second click on the same node within
    /// the double-click window asks the host to open the file.
    pub fn click(&mut self, sx: f64, sy: f64, now_ms: f64) {
        if std::mem::take(&mut self.suppress_click) {
            return;
        }
        match self.node_at(sx, sy) {
            Some(idx) => match self.clicks.register(idx, now_ms) {
                ClickKind::Single => self.focus(idx, now_ms),
                ClickKind::Double => {
                    let path = PathBuf::from(&self.graph.nodes[idx].id);
                    debug!(path = %path.display(), "open file requested");
                    self.signals.push(HostSignal::OpenFile(path));
                }
            },
            None => {
                self.clicks.clear();
                self.highlighted = None;
            }
        }
    }

    /// Highlights a node and starts the camera animation toward it.
    pub fn focus(&mut self, idx: usize, now_ms: f64) {
        let Some(node) = self.graph.nodes.get(idx) else {
            return;
        };
        let target = Camera::centered_on(node.x, node.y, FOCUS_SCALE, self.width, self.height);
        self.highlighted = Some(idx);
        self.animation = Some(CameraAnimation::new(self.camera, target, now_ms));
    }

    pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
        self.animation = None;
        self.camera.wheel(sx, sy, delta_y);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.simulation.set_viewport(width, height);
        self.simulation.reheat(self.simulation.config.drag_alpha);
    }

    /// Stops the loop; every later [`frame`](Self::frame) returns `None`.
    pub fn close(&mut self) {
        self.closed = true;
        self.animation = None;
        self.interaction = Interaction::Idle;
    }

    pub fn search_input(&mut self, query: &str, now_ms: f64) {
        self.search.input(query, now_ms);
    }

    /// Forwards a key to the search box; Enter on a match focuses the node.
    pub fn search_key(&mut self, key: SearchKey, now_ms: f64) -> Option<usize> {
        let chosen = self.search.key(key, &self.graph)?;
        self.focus(chosen, now_ms);
        Some(chosen)
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.color_mode = mode;
    }

    /// Replaces heat scores on every node; missing ids read as 0.
    pub fn apply_heat(&mut self, heat: &HeatScores) {
        self.graph.apply_heat(heat);
    }

    pub fn drain_signals(&mut self) -> Vec<HostSignal> {
        std::mem::take(&mut self.signals)
    }

    pub fn tooltip(&self) -> Option<Tooltip> {
        if !matches!(self.interaction, Interaction::Idle) {
            return None;
        }
        let node = self.graph.nodes.get(self.hovered?)?;
        let (sx, sy) = self.camera.world_to_screen(node.x, node.y);
        Some(Tooltip::for_node(node, sx, sy))
    }

    pub fn cursor(&self) -> Cursor {
        match self.interaction {
            Interaction::DraggingNode(_) => Cursor::Grabbing,
            Interaction::Panning { .. } => Cursor::Move,
            Interaction::Idle if self.hovered.is_some() => Cursor::Pointer,
            Interaction::Idle => Cursor::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::frame::DrawCommand;
    use crate::types::{GraphLink, GraphNode};
    use std::path::Path;

    fn codebase(n: usize, links: &[(usize, usize)]) -> CodebaseGraph {
        let mut g = CodebaseGraph::empty();
        for i in 0..n {
            g.nodes
                .push(GraphNode::for_path(Path::new(&format!("/ws/src/n{}.ts", i)), Path::new("/ws")));
        }
        for (s, t) in links {
            g.links.push(GraphLink::dependency(
                format!("/ws/src/n{}.ts", s),
                format!("/ws/src/n{}.ts", t),
            ));
        }
        g
    }

    fn settled_view() -> GraphView {
        let mut view = GraphView::new(&codebase(4, &[(0, 1), (1, 2), (2, 3)]), 800.0, 600.0).unwrap();
        view.settle(10_000);
        view
    }

    fn screen_of(view: &GraphView, idx: usize) -> (f64, f64) {
        let node = &view.graph().nodes[idx];
        view.camera().world_to_screen(node.x, node.y)
    }

    #[test]
    fn test_graph_ready_signal_on_construction() {
        let mut view = GraphView::new(&codebase(3, &[(0, 1), (0, 1)]), 800.0, 600.0).unwrap();
        assert_eq!(
            view.drain_signals(),
            vec![HostSignal::GraphReady { nodes: 3, links: 2 }]
        );
        assert!(view.drain_signals().is_empty());
    }

    #[test]
    fn test_dangling_link_rejected() {
        let mut g = codebase(1, &[]);
        g.links.push(GraphLink::dependency("/ws/src/n0.ts", "/ws/src/missing.ts"));
        assert!(GraphView::new(&g, 800.0, 600.0).is_err());
    }

    #[test]
    fn test_zero_viewport_rejected() {
        let err = GraphView::new(&codebase(1, &[]), 0.0, 600.0).err().unwrap();
        assert!(matches!(err, AtlasicError::InvalidArgument { .. }));
    }

    #[test]
    fn test_settle_then_every_frame_renders() {
        let mut view = settled_view();
        assert!(view.simulation().is_settled());
        let frame = view.frame(0.0).unwrap();
        assert_eq!(frame.count(|c| matches!(c, DrawCommand::Circle { .. })), 4);
        assert!(view.frame(16.0).is_some());
    }

    #[test]
    fn test_click_then_double_click_opens_file() {
        let mut view = settled_view();
        view.drain_signals();
        let (sx, sy) = screen_of(&view, 2);

        view.click(sx, sy, 1_000.0);
        assert_eq!(view.highlighted(), Some(2));
        assert!(view.is_animating());
        assert!(view.drain_signals().is_empty());

        view.click(sx, sy, 1_200.0);
        assert_eq!(
            view.drain_signals(),
            vec![HostSignal::OpenFile(PathBuf::from("/ws/src/n2.ts"))]
        );
    }

    #[test]
    fn test_slow_second_click_does_not_open() {
        let mut view = settled_view();
        view.drain_signals();
        let (sx, sy) = screen_of(&view, 1);
        view.click(sx, sy, 0.0);
        view.click(sx, sy, 500.0);
        assert!(view.drain_signals().is_empty());
        assert_eq!(view.highlighted(), Some(1));
    }

    #[test]
    fn test_click_on_empty_space_clears_highlight() {
        let mut view = settled_view();
        let (sx, sy) = screen_of(&view, 0);
        view.click(sx, sy, 0.0);
        assert_eq!(view.highlighted(), Some(0));
        view.click(-5_000.0, -5_000.0, 100.0);
        assert_eq!(view.highlighted(), None);
    }

    #[test]
    fn test_camera_animation_reaches_focus_scale() {
        let mut view = settled_view();
        let (sx, sy) = screen_of(&view, 3);
        view.click(sx, sy, 0.0);
        view.frame(100.0);
        assert!(view.camera().k > 1.0 && view.camera().k < FOCUS_SCALE);
        view.frame(800.0);
        assert!(!view.is_animating());
        assert_eq!(view.camera().k, FOCUS_SCALE);
        let (cx, cy) = screen_of(&view, 3);
        assert!((cx - 400.0).abs() < 1e-6 && (cy - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_drag_pins_then_releases() {
        let mut view = settled_view();
        let (sx, sy) = screen_of(&view, 0);
        view.pointer_down(sx, sy);
        assert_eq!(view.interaction(), Interaction::DraggingNode(0));
        assert_eq!(view.cursor(), Cursor::Grabbing);
        assert!(!view.simulation().is_settled());

        view.pointer_move(sx + 50.0, sy + 20.0);
        let node = &view.graph().nodes[0];
        assert!(node.fx.is_some());
        assert!((node.x - (sx + 50.0)).abs() < 1e-9);

        view.pointer_up();
        assert_eq!(view.interaction(), Interaction::Idle);
        assert!(view.graph().nodes[0].fx.is_none());

        // The click the host sends after a drag must not highlight.
        view.click(sx + 50.0, sy + 20.0, 0.0);
        assert_eq!(view.highlighted(), None);
    }

    #[test]
    fn test_pan_moves_camera() {
        let mut view = settled_view();
        view.pointer_down(-5_000.0, -5_000.0);
        assert_eq!(view.cursor(), Cursor::Move);
        view.pointer_move(-4_990.0, -4_995.0);
        assert_eq!(view.camera().x, 10.0);
        assert_eq!(view.camera().y, 5.0);
        view.pointer_up();
        assert_eq!(view.cursor(), Cursor::Default);
    }

    #[test]
    fn test_hover_tooltip() {
        let mut view = settled_view();
        let (sx, sy) = screen_of(&view, 1);
        view.pointer_move(sx + 2.0, sy);
        assert_eq!(view.hovered(), Some(1));
        assert_eq!(view.cursor(), Cursor::Pointer);
        let tip = view.tooltip().unwrap();
        assert_eq!(tip.label, "n1.ts");
        assert_eq!(tip.path, "/ws/src/n1.ts");
        assert_eq!(tip.in_degree, 1);
        assert_eq!(tip.language, "ts");

        view.pointer_leave();
        assert!(view.tooltip().is_none());
    }

    #[test]
    fn test_wheel_zooms_about_pointer() {
        let mut view = settled_view();
        view.wheel(400.0, 300.0, -100.0);
        let cam = view.camera();
        assert!((cam.k - 1.1).abs() < 1e-12);
        let (wx, wy) = cam.screen_to_world(400.0, 300.0);
        assert!((wx - 400.0).abs() < 1e-9 && (wy - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_close_stops_frames() {
        let mut view = settled_view();
        assert!(view.frame(0.0).is_some());
        view.close();
        assert!(view.frame(16.0).is_none());
        assert!(view.is_closed());
    }

    #[test]
    fn test_search_enter_focuses_node() {
        let mut view = settled_view();
        view.search_input("n3", 0.0);
        view.frame(10.0);
        assert!(view.search().suggestions().is_empty());
        view.frame(200.0);
        assert_eq!(view.search().suggestions().len(), 1);
        view.search_key(SearchKey::ArrowDown, 210.0);
        assert_eq!(view.search_key(SearchKey::Enter, 220.0), Some(3));
        assert_eq!(view.highlighted(), Some(3));
        assert!(view.is_animating());
    }

    #[test]
    fn test_heat_and_color_mode() {
        let mut view = settled_view();
        let mut scores = std::collections::HashMap::new();
        scores.insert("/ws/src/n0.ts".to_string(), 5.0);
        view.apply_heat(&HeatScores::new(scores));
        view.set_color_mode(ColorMode::Heat);
        assert_eq!(view.graph().nodes[0].heat, 5.0);
        assert_eq!(view.graph().nodes[1].heat, 0.0);
        assert_eq!(view.color_mode(), ColorMode::Heat);
        assert!(view.frame(0.0).is_some());
    }

    #[test]
    fn test_resize_recenters_simulation() {
        let mut view = settled_view();
        view.resize(1_000.0, 1_000.0);
        assert_eq!(view.simulation().center(), (500.0, 500.0));
        assert!(!view.simulation().is_settled());
    }
}
