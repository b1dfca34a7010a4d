//! Barnes-Hut approximation of all-pairs repulsion.
//!
//! Each cell stores the body count and center of mass of everything below
//! it. A cell whose width over distance is below `theta` acts as a single
//! body; otherwise its children are visited. Distances are clamped to at
//! least 1 so coincident bodies never produce infinite forces.

use super::quadtree::Rect;

/// Padding around the body cloud when sizing the root cell.
pub const BH_PADDING: f64 = 100.0;
const MAX_DEPTH: usize = 24;

#[derive(Debug, Clone)]
struct Cell {
    bounds: Rect,
    depth: usize,
    mass: f64,
    cx: f64,
    cy: f64,
    /// Sole body of a leaf with mass 1.
    body: Option<usize>,
    children: Option<[usize; 4]>,
}

impl Cell {
    fn empty(bounds: Rect, depth: usize) -> Self {
        Self {
            bounds,
            depth,
            mass: 0.0,
            cx: 0.0,
            cy: 0.0,
            body: None,
            children: None,
        }
    }
}

/// Mass-aggregating quadtree over body positions.
#[derive(Debug, Clone)]
pub struct BarnesHutTree {
    cells: Vec<Cell>,
}

impl BarnesHutTree {
    /// Builds the tree; `positions[i]` is body `i`.
    pub fn build(positions: &[(f64, f64)]) -> Self {
        let bounds = Rect::bounding(positions.iter().copied(), BH_PADDING)
            .map(|r| Rect::new(r.x, r.y, r.w.max(1.0), r.h.max(1.0)))
            .unwrap_or(Rect::new(0.0, 0.0, 1.0, 1.0));

        let mut tree = Self {
            cells: vec![Cell::empty(bounds, 0)],
        };
        for (i, &(x, y)) in positions.iter().enumerate() {
            if x.is_finite() && y.is_finite() {
                tree.insert(i, x, y, positions);
            }
        }
        tree
    }

    pub fn total_mass(&self) -> f64 {
        self.cells[0].mass
    }

    fn insert(&mut self, body: usize, x: f64, y: f64, positions: &[(f64, f64)]) {
        let mut idx = 0;
        loop {
            let cell = &mut self.cells[idx];
            if cell.mass == 0.0 {
                cell.body = Some(body);
                cell.mass = 1.0;
                cell.cx = x;
                cell.cy = y;
                return;
            }

            let total = cell.mass + 1.0;
            cell.cx = (cell.cx * cell.mass + x) / total;
            cell.cy = (cell.cy * cell.mass + y) / total;
            cell.mass = total;

            if cell.depth >= MAX_DEPTH {
                // Coincident bodies: aggregate without splitting further.
                cell.body = None;
                return;
            }

            let existing = cell.children;
            let children = match existing {
                Some(c) => c,
                None => {
                    let previous = cell.body.take();
                    let children = self.subdivide(idx);
                    if let Some(prev) = previous {
                        let (px, py) = positions[prev];
                        let child = self.child_for(idx, px, py);
                        let c = &mut self.cells[children[child]];
                        c.body = Some(prev);
                        c.mass = 1.0;
                        c.cx = px;
                        c.cy = py;
                    }
                    children
                }
            };
            idx = children[self.child_for(idx, x, y)];
        }
    }

    fn subdivide(&mut self, idx: usize) -> [usize; 4] {
        let depth = self.cells[idx].depth + 1;
        let Rect { x, y, w, h } = self.cells[idx].bounds;
        let hw = w / 2.0;
        let hh = h / 2.0;
        let base = self.cells.len();
        self.cells.push(Cell::empty(Rect::new(x, y, hw, hh), depth));
        self.cells.push(Cell::empty(Rect::new(x + hw, y, hw, hh), depth));
        self.cells.push(Cell::empty(Rect::new(x, y + hh, hw, hh), depth));
        self.cells.push(Cell::empty(Rect::new(x + hw, y + hh, hw, hh), depth));
        let children = [base, base + 1, base + 2, base + 3];
        self.cells[idx].children = Some(children);
        children
    }

    fn child_for(&self, idx: usize, x: f64, y: f64) -> usize {
        let b = self.cells[idx].bounds;
        let mid_x = b.x + b.w / 2.0;
        let mid_y = b.y + b.h / 2.0;
        usize::from(x >= mid_x) + 2 * usize::from(y >= mid_y)
    }

    /// Net force on body `body` at `(x, y)`. Negative `strength` repels.
    pub fn force_on(&self, body: usize, x: f64, y: f64, theta: f64, strength: f64) -> (f64, f64) {
        let mut fx = 0.0;
        let mut fy = 0.0;
        let mut stack = vec![0usize];

        while let Some(idx) = stack.pop() {
            let cell = &self.cells[idx];
            if cell.mass == 0.0 {
                continue;
            }

            let dx = cell.cx - x;
            let dy = cell.cy - y;
            let dist_sq = (dx * dx + dy * dy).max(1.0);
            let dist = dist_sq.sqrt();

            if let Some(b) = cell.body {
                if b != body {
                    let force = strength / dist_sq;
                    fx += dx / dist * force;
                    fy += dy / dist * force;
                }
                continue;
            }

            match cell.children {
                Some(children) if cell.bounds.w / dist >= theta => stack.extend(children),
                _ => {
                    let force = strength * cell.mass / dist_sq;
                    fx += dx / dist * force;
                    fy += dy / dist * force;
                }
            }
        }

        (fx, fy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact_force(positions: &[(f64, f64)], i: usize, strength: f64) -> (f64, f64) {
        let (x, y) = positions[i];
        positions
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .fold((0.0, 0.0), |(fx, fy), (_, &(ox, oy))| {
                let dx = ox - x;
                let dy = oy - y;
                let d2 = (dx * dx + dy * dy).max(1.0);
                let d = d2.sqrt();
                (fx + dx / d * strength / d2, fy + dy / d * strength / d2)
            })
    }

    #[test]
    fn test_two_bodies_repel() {
        let positions = [(0.0, 0.0), (10.0, 0.0)];
        let tree = BarnesHutTree::build(&positions);
        assert_eq!(tree.total_mass(), 2.0);
        let (fx, fy) = tree.force_on(0, 0.0, 0.0, 0.9, -400.0);
        assert!(fx < 0.0, "body 0 pushed away from body 1, got {}", fx);
        assert!(fy.abs() < 1e-9);
        assert!((fx + 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_theta_zero_is_exact() {
        let positions: Vec<(f64, f64)> = (0..50)
            .map(|i| {
                let a = i as f64 * 0.7;
                (a.cos() * (20.0 + i as f64 * 3.0), a.sin() * (20.0 + i as f64 * 3.0))
            })
            .collect();
        let tree = BarnesHutTree::build(&positions);
        for i in [0, 17, 49] {
            let (ax, ay) = tree.force_on(i, positions[i].0, positions[i].1, 0.0, -400.0);
            let (ex, ey) = exact_force(&positions, i, -400.0);
            assert!((ax - ex).abs() < 1e-9 && (ay - ey).abs() < 1e-9);
        }
    }

    #[test]
    fn test_coincident_bodies_finite() {
        let positions = vec![(3.0, 3.0); 64];
        let tree = BarnesHutTree::build(&positions);
        assert_eq!(tree.total_mass(), 64.0);
        let (fx, fy) = tree.force_on(0, 3.0, 3.0, 0.9, -400.0);
        assert!(fx.is_finite() && fy.is_finite());
    }
}
