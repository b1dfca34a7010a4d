//! Pointer state, click disambiguation and hover presentation.

use serde::Serialize;

use crate::layout::LayoutNode;
use crate::types::Category;

/// A second click on the same node within this window is a double click.
pub const DOUBLE_CLICK_WINDOW_MS: f64 = 350.0;

/// Screen-space movement below this is still a click, not a drag.
pub const DRAG_THRESHOLD_PX: f64 = 3.0;

/// What the pointer is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// Arena index of the node under the pointer.
    DraggingNode(usize),
    /// Last pointer position in screen coordinates.
    Panning { last: (f64, f64) },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    Default,
    Pointer,
    Grabbing,
    Move,
}

impl Cursor {
    /// CSS cursor keyword.
    pub fn as_css(&self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Pointer => "pointer",
            Cursor::Grabbing => "grabbing",
            Cursor::Move => "move",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    Single,
    Double,
}

/// Pairs clicks on the same node into double clicks.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    pending: Option<(usize, f64)>,
}

impl ClickTracker {
    /// Records a click on `node` at `now_ms`.
    ///
    /// A double click consumes the window, so a third click starts over.
    pub fn register(&mut self, node: usize, now_ms: f64) -> ClickKind {
        match self.pending {
            Some((prev, at)) if prev == node && now_ms - at <= DOUBLE_CLICK_WINDOW_MS => {
                self.pending = None;
                ClickKind::Double
            }
            _ => {
                self.pending = Some((node, now_ms));
                ClickKind::Single
            }
        }
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self, now_ms: f64) -> bool {
        matches!(self.pending, Some((_, at)) if now_ms - at <= DOUBLE_CLICK_WINDOW_MS)
    }
}

/// Hover card contents, anchored at a screen position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub label: String,
    pub path: String,
    pub category: Category,
    pub in_degree: usize,
    pub language: String,
    pub x: f64,
    pub y: f64,
}

impl Tooltip {
    pub fn for_node(node: &LayoutNode, sx: f64, sy: f64) -> Self {
        Self {
            label: node.label.clone(),
            path: node.id.clone(),
            category: node.category,
            in_degree: node.in_degree,
            language: node.language.clone(),
            x: sx,
            y: sy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_click_within_window() {
        let mut clicks = ClickTracker::default();
        assert_eq!(clicks.register(3, 1_000.0), ClickKind::Single);
        assert!(clicks.is_pending(1_200.0));
        assert_eq!(clicks.register(3, 1_300.0), ClickKind::Double);
        assert!(!clicks.is_pending(1_300.0));
        assert_eq!(clicks.register(3, 1_400.0), ClickKind::Single);
    }

    #[test]
    fn test_slow_or_different_clicks_are_single() {
        let mut clicks = ClickTracker::default();
        assert_eq!(clicks.register(1, 0.0), ClickKind::Single);
        assert_eq!(clicks.register(1, 351.0), ClickKind::Single);
        assert_eq!(clicks.register(2, 400.0), ClickKind::Single);
        clicks.clear();
        assert_eq!(clicks.register(2, 450.0), ClickKind::Single);
    }

    #[test]
    fn test_second_click_on_other_node_restarts_window() {
        let mut clicks = ClickTracker::default();
        assert_eq!(clicks.register(1, 0.0), ClickKind::Single);
        assert_eq!(clicks.register(2, 100.0), ClickKind::Single);
        assert_eq!(clicks.register(2, 200.0), ClickKind::Double);
    }

    #[test]
    fn test_cursor_css() {
        assert_eq!(Cursor::Grabbing.as_css(), "grabbing");
        assert_eq!(serde_json::to_string(&Cursor::Pointer).unwrap(), "\"pointer\"");
    }
}
