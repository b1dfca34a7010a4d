//! Point quadtree for hit-testing.
//!
//! Nodes live in an arena (`Vec`) and refer to their children by index.
//! Bounds are half-open for insertion, so a point on a shared edge belongs
//! to exactly one quadrant; queries use closed rectangles.

/// Axis-aligned rectangle, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// `[x, x+w) × [y, y+h)`
    #[inline]
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }

    /// `[x, x+w] × [y, y+h]`
    #[inline]
    pub fn contains_closed(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }

    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.x + self.w < other.x
            || other.x + other.w < self.x
            || self.y + self.h < other.y
            || other.y + other.h < self.y)
    }

    /// Smallest rectangle holding every point, grown by `padding` per side.
    pub fn bounding(points: impl IntoIterator<Item = (f64, f64)>, padding: f64) -> Option<Self> {
        let mut iter = points.into_iter().filter(|(x, y)| x.is_finite() && y.is_finite());
        let (x0, y0) = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
        for (x, y) in iter {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Self::new(
            min_x - padding,
            min_y - padding,
            (max_x - min_x) + padding * 2.0,
            (max_y - min_y) + padding * 2.0,
        ))
    }

    fn quadrants(&self) -> [Rect; 4] {
        let hw = self.w / 2.0;
        let hh = self.h / 2.0;
        [
            Rect::new(self.x, self.y, hw, hh),
            Rect::new(self.x + hw, self.y, hw, hh),
            Rect::new(self.x, self.y + hh, hw, hh),
            Rect::new(self.x + hw, self.y + hh, hw, hh),
        ]
    }
}

pub const DEFAULT_CAPACITY: usize = 8;
pub const DEFAULT_MAX_DEPTH: usize = 20;
/// Padding around the point cloud when building from positions.
pub const BUILD_PADDING: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct QuadPoint<T> {
    pub x: f64,
    pub y: f64,
    pub item: T,
}

#[derive(Debug, Clone)]
struct QuadNode<T> {
    bounds: Rect,
    depth: usize,
    points: Vec<QuadPoint<T>>,
    children: Option<[usize; 4]>,
}

/// Arena-backed point quadtree.
#[derive(Debug, Clone)]
pub struct Quadtree<T> {
    nodes: Vec<QuadNode<T>>,
    capacity: usize,
    max_depth: usize,
    len: usize,
}

impl<T> Quadtree<T> {
    pub fn new(bounds: Rect, capacity: usize) -> Self {
        Self::with_max_depth(bounds, capacity, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(bounds: Rect, capacity: usize, max_depth: usize) -> Self {
        Self {
            nodes: vec![QuadNode {
                bounds,
                depth: 0,
                points: Vec::new(),
                children: None,
            }],
            capacity: capacity.max(1),
            max_depth,
            len: 0,
        }
    }

    /// Builds a tree over `points` with bounds padded by [`BUILD_PADDING`].
    pub fn build(points: impl IntoIterator<Item = (f64, f64, T)>, capacity: usize) -> Self {
        let points: Vec<(f64, f64, T)> = points.into_iter().collect();
        let bounds = Rect::bounding(points.iter().map(|(x, y, _)| (*x, *y)), BUILD_PADDING)
            .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
        let mut tree = Self::new(bounds, capacity);
        for (x, y, item) in points {
            tree.insert(x, y, item);
        }
        tree
    }

    pub fn bounds(&self) -> Rect {
        self.nodes[0].bounds
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns false when the point lies outside the root bounds.
    pub fn insert(&mut self, x: f64, y: f64, item: T) -> bool {
        if !self.nodes[0].bounds.contains(x, y) {
            return false;
        }

        let mut idx = 0;
        loop {
            let node = &self.nodes[idx];
            let full = node.points.len() >= self.capacity;
            let at_max_depth = node.depth >= self.max_depth;
            let existing = node.children;

            if !full || at_max_depth {
                break;
            }

            let children = match existing {
                Some(c) => c,
                None => self.subdivide(idx),
            };
            match children
                .iter()
                .copied()
                .find(|&c| self.nodes[c].bounds.contains(x, y))
            {
                Some(next) => idx = next,
                // Rounding at quadrant edges: keep the point here.
                None => break,
            }
        }

        self.nodes[idx].points.push(QuadPoint { x, y, item });
        self.len += 1;
        true
    }

    fn subdivide(&mut self, idx: usize) -> [usize; 4] {
        let depth = self.nodes[idx].depth + 1;
        let quads = self.nodes[idx].bounds.quadrants();
        let base = self.nodes.len();
        for bounds in quads {
            self.nodes.push(QuadNode {
                bounds,
                depth,
                points: Vec::new(),
                children: None,
            });
        }
        let children = [base, base + 1, base + 2, base + 3];
        self.nodes[idx].children = Some(children);
        children
    }

    /// Every point inside the closed `range`.
    pub fn query(&self, range: &Rect) -> Vec<&QuadPoint<T>> {
        let mut found = Vec::new();
        let mut stack = vec![0usize];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if !node.bounds.intersects(range) {
                continue;
            }
            found.extend(node.points.iter().filter(|p| range.contains_closed(p.x, p.y)));
            if let Some(children) = node.children {
                stack.extend(children.iter().rev());
            }
        }
        found
    }

    /// Nearest point strictly within `radius` of `(x, y)`.
    pub fn find_nearest(&self, x: f64, y: f64, radius: f64) -> Option<&T> {
        let range = Rect::new(x - radius, y - radius, radius * 2.0, radius * 2.0);
        let mut best: Option<&QuadPoint<T>> = None;
        let mut best_d2 = radius * radius;
        for p in self.query(&range) {
            let dx = p.x - x;
            let dy = p.y - y;
            let d2 = dx * dx + dy * dy;
            if d2 < best_d2 {
                best_d2 = d2;
                best = Some(p);
            }
        }
        best.map(|p| &p.item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Small deterministic LCG so the tests need no extra crates.
    fn pseudo_points(n: usize, seed: u64) -> Vec<(f64, f64, usize)> {
        let mut state = seed;
        let mut next = || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) as f64) / ((1u64 << 31) as f64)
        };
        (0..n).map(|i| (next() * 1000.0 - 500.0, next() * 800.0 - 400.0, i)).collect()
    }

    #[test]
    fn test_insert_outside_bounds_rejected() {
        let mut tree = Quadtree::new(Rect::new(0.0, 0.0, 10.0, 10.0), 4);
        assert!(tree.insert(0.0, 0.0, 1));
        assert!(!tree.insert(10.0, 5.0, 2));
        assert!(!tree.insert(-0.1, 5.0, 3));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_query_matches_brute_force() {
        let points = pseudo_points(2_000, 7);
        let tree = Quadtree::build(points.clone(), DEFAULT_CAPACITY);
        assert_eq!(tree.len(), points.len());

        for range in [
            Rect::new(-100.0, -100.0, 200.0, 150.0),
            Rect::new(300.0, 0.0, 500.0, 500.0),
            Rect::new(-500.0, -400.0, 1000.0, 800.0),
            Rect::new(10_000.0, 10_000.0, 5.0, 5.0),
        ] {
            let mut got: Vec<usize> = tree.query(&range).iter().map(|p| p.item).collect();
            got.sort_unstable();
            let expected: Vec<usize> = points
                .iter()
                .filter(|(x, y, _)| range.contains_closed(*x, *y))
                .map(|(_, _, i)| *i)
                .collect();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_coincident_points_do_not_recurse_forever() {
        let points: Vec<(f64, f64, usize)> = (0..100).map(|i| (5.0, 5.0, i)).collect();
        let tree = Quadtree::build(points, 8);
        assert_eq!(tree.len(), 100);
        assert_eq!(tree.query(&Rect::new(4.0, 4.0, 2.0, 2.0)).len(), 100);
    }

    #[test]
    fn test_find_nearest_strictly_within_radius() {
        let tree = Quadtree::build(vec![(0.0, 0.0, "a"), (10.0, 0.0, "b"), (30.0, 0.0, "c")], 8);
        assert_eq!(tree.find_nearest(6.0, 0.0, 12.0), Some(&"b"));
        assert_eq!(tree.find_nearest(3.0, 0.0, 12.0), Some(&"a"));
        assert_eq!(tree.find_nearest(42.0, 0.0, 12.0), None);
        assert_eq!(tree.find_nearest(18.0, 0.0, 12.0), Some(&"b"));
    }

    #[test]
    fn test_empty_build() {
        let tree: Quadtree<usize> = Quadtree::build(Vec::new(), 8);
        assert!(tree.is_empty());
        assert!(tree.find_nearest(0.0, 0.0, 12.0).is_none());
    }
}
