//! Debounced node search with keyboard navigation.

use serde::Serialize;

use crate::layout::LayoutGraph;

pub const MAX_SUGGESTIONS: usize = 10;
pub const SEARCH_DEBOUNCE_MS: f64 = 150.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    /// Arena index of the node.
    pub index: usize,
    pub label: String,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

/// Case-insensitive substring match on label or path, in node order.
pub fn find_matches(graph: &LayoutGraph, query: &str, limit: usize) -> Vec<usize> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    graph
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| {
            n.label.to_lowercase().contains(&needle) || n.id.to_lowercase().contains(&needle)
        })
        .map(|(i, _)| i)
        .take(limit)
        .collect()
}

/// First node whose label or path equals `query`, ignoring case.
pub fn exact_match(graph: &LayoutGraph, query: &str) -> Option<usize> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    graph
        .nodes
        .iter()
        .position(|n| n.label.to_lowercase() == needle || n.id.to_lowercase() == needle)
}

#[derive(Debug, Clone)]
pub struct SearchState {
    query: String,
    /// Time of the last keystroke not yet searched.
    pending_since: Option<f64>,
    suggestions: Vec<Suggestion>,
    /// -1 when nothing is selected.
    selected: isize,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            pending_since: None,
            suggestions: Vec::new(),
            selected: -1,
        }
    }
}

impl SearchState {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn selected(&self) -> isize {
        self.selected
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Records new input; suggestions refresh once the debounce elapses.
    pub fn input(&mut self, query: &str, now_ms: f64) {
        self.query = query.to_string();
        self.pending_since = Some(now_ms);
    }

    /// Recomputes suggestions when the debounce has elapsed. Returns true
    /// when they changed.
    pub fn poll(&mut self, graph: &LayoutGraph, now_ms: f64) -> bool {
        match self.pending_since {
            Some(at) if now_ms - at >= SEARCH_DEBOUNCE_MS => {
                self.pending_since = None;
                self.refresh(graph);
                true
            }
            _ => false,
        }
    }

    fn refresh(&mut self, graph: &LayoutGraph) {
        self.suggestions = find_matches(graph, &self.query, MAX_SUGGESTIONS)
            .into_iter()
            .map(|i| Suggestion {
                index: i,
                label: graph.nodes[i].label.clone(),
                path: graph.nodes[i].id.clone(),
            })
            .collect();
        self.selected = -1;
    }

    /// Handles a navigation key. Returns the chosen node on Enter.
    pub fn key(&mut self, key: SearchKey, graph: &LayoutGraph) -> Option<usize> {
        let last = self.suggestions.len() as isize - 1;
        match key {
            SearchKey::ArrowDown => {
                self.selected = (self.selected + 1).min(last);
                None
            }
            SearchKey::ArrowUp => {
                self.selected = (self.selected - 1).max(-1);
                None
            }
            SearchKey::Escape => {
                self.dismiss();
                None
            }
            SearchKey::Enter => {
                let chosen = usize::try_from(self.selected)
                    .ok()
                    .and_then(|s| self.suggestions.get(s))
                    .map(|s| s.index)
                    .or_else(|| exact_match(graph, &self.query));
                if let Some(i) = chosen {
                    self.query = graph.nodes[i].label.clone();
                    self.dismiss();
                }
                chosen
            }
        }
    }

    fn dismiss(&mut self) {
        self.suggestions.clear();
        self.selected = -1;
        self.pending_since = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CodebaseGraph, GraphNode};
    use std::path::Path;

    fn graph(names: &[&str]) -> LayoutGraph {
        let mut g = CodebaseGraph::empty();
        for name in names {
            g.nodes
                .push(GraphNode::for_path(&Path::new("/ws/src").join(name), Path::new("/ws")));
        }
        LayoutGraph::from_codebase(&g).unwrap()
    }

    #[test]
    fn test_matches_label_and_path_case_insensitive() {
        let g = graph(&["Button.tsx", "api/user.ts", "main.go"]);
        assert_eq!(find_matches(&g, "BUTTON", 10), vec![0]);
        assert_eq!(find_matches(&g, "/api/", 10), vec![1]);
        assert_eq!(find_matches(&g, "src", 10), vec![0, 1, 2]);
        assert!(find_matches(&g, "  ", 10).is_empty());
    }

    #[test]
    fn test_suggestions_capped() {
        let names: Vec<String> = (0..25).map(|i| format!("file{}.ts", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let g = graph(&refs);
        let mut search = SearchState::default();
        search.input("file", 0.0);
        assert!(search.poll(&g, 150.0));
        assert_eq!(search.suggestions().len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn test_debounce_waits_for_quiet() {
        let g = graph(&["alpha.ts", "beta.ts"]);
        let mut search = SearchState::default();
        search.input("a", 0.0);
        search.input("al", 100.0);
        assert!(!search.poll(&g, 200.0));
        assert!(search.suggestions().is_empty());
        assert!(search.poll(&g, 250.0));
        assert_eq!(search.suggestions()[0].label, "alpha.ts");
        assert!(!search.poll(&g, 400.0));
    }

    #[test]
    fn test_selection_stays_in_range() {
        let g = graph(&["a1.ts", "a2.ts"]);
        let mut search = SearchState::default();
        search.input("a", 0.0);
        search.poll(&g, 150.0);
        assert_eq!(search.selected(), -1);
        search.key(SearchKey::ArrowUp, &g);
        assert_eq!(search.selected(), -1);
        search.key(SearchKey::ArrowDown, &g);
        search.key(SearchKey::ArrowDown, &g);
        search.key(SearchKey::ArrowDown, &g);
        assert_eq!(search.selected(), 1);
        assert_eq!(search.key(SearchKey::Enter, &g), Some(1));
        assert!(search.suggestions().is_empty());
        assert_eq!(search.query(), "a2.ts");
    }

    #[test]
    fn test_enter_falls_back_to_exact_match() {
        let g = graph(&["main.ts", "Main.go"]);
        let mut search = SearchState::default();
        search.input("MAIN.GO", 0.0);
        assert_eq!(search.key(SearchKey::Enter, &g), Some(1));

        search.input("mai", 0.0);
        assert_eq!(search.key(SearchKey::Enter, &g), None);
    }

    #[test]
    fn test_arrow_down_without_suggestions() {
        let g = graph(&["x.ts"]);
        let mut search = SearchState::default();
        search.key(SearchKey::ArrowDown, &g);
        assert_eq!(search.selected(), -1);
    }
}
