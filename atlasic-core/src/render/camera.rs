//! Pan/zoom transform between screen pixels and world units.

use crate::layout::Rect;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
pub const ZOOM_IN_FACTOR: f64 = 1.1;
pub const ZOOM_OUT_FACTOR: f64 = 0.9;
pub const FOCUS_SCALE: f64 = 2.0;
pub const FOCUS_DURATION_MS: f64 = 750.0;

/// `screen = world * k + (x, y)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, k: 1.0 }
    }
}

impl Camera {
    pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        ((sx - self.x) / self.k, (sy - self.y) / self.k)
    }

    pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        (wx * self.k + self.x, wy * self.k + self.y)
    }

    /// World rectangle covered by a `width × height` viewport.
    pub fn visible_world(&self, width: f64, height: f64) -> Rect {
        let (x1, y1) = self.screen_to_world(0.0, 0.0);
        let (x2, y2) = self.screen_to_world(width, height);
        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Scales by `factor` keeping the world point under `(sx, sy)` fixed.
    pub fn zoom_about(&mut self, sx: f64, sy: f64, factor: f64) {
        let new_k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let ratio = new_k / self.k;
        self.x = sx - (sx - self.x) * ratio;
        self.y = sy - (sy - self.y) * ratio;
        self.k = new_k;
    }

    /// Wheel step: negative `delta_y` zooms in.
    pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
        let factor = if delta_y < 0.0 { ZOOM_IN_FACTOR } else { ZOOM_OUT_FACTOR };
        self.zoom_about(sx, sy, factor);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Camera that centers world `(wx, wy)` at scale `k`.
    pub fn centered_on(wx: f64, wy: f64, k: f64, width: f64, height: f64) -> Self {
        Self {
            x: width / 2.0 - wx * k,
            y: height / 2.0 - wy * k,
            k,
        }
    }

    /// Camera that shows all of `bounds` with `margin` pixels around it.
    pub fn fit_to(bounds: Rect, width: f64, height: f64, margin: f64) -> Self {
        let avail_w = (width - 2.0 * margin).max(1.0);
        let avail_h = (height - 2.0 * margin).max(1.0);
        let k = if bounds.w <= 0.0 && bounds.h <= 0.0 {
            1.0
        } else {
            (avail_w / bounds.w.max(1.0)).min(avail_h / bounds.h.max(1.0))
        }
        .clamp(MIN_ZOOM, MAX_ZOOM);
        Self::centered_on(bounds.x + bounds.w / 2.0, bounds.y + bounds.h / 2.0, k, width, height)
    }
}

/// Ease-out quadratic.
pub fn ease_out_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * (2.0 - t)
}

/// Time-based camera transition driven by an injected clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraAnimation {
    pub from: Camera,
    pub to: Camera,
    pub start_ms: f64,
    pub duration_ms: f64,
}

impl CameraAnimation {
    pub fn new(from: Camera, to: Camera, start_ms: f64) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms: FOCUS_DURATION_MS,
        }
    }

    /// Camera at `now_ms` and whether the animation has finished.
    pub fn sample(&self, now_ms: f64) -> (Camera, bool) {
        let t = if self.duration_ms <= 0.0 {
            1.0
        } else {
            ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
        };
        if t >= 1.0 {
            return (self.to, true);
        }
        let e = ease_out_quad(t);
        let lerp = |a: f64, b: f64| a + (b - a) * e;
        (
            Camera {
                x: lerp(self.from.x, self.to.x),
                y: lerp(self.from.y, self.to.y),
                k: lerp(self.from.k, self.to.k),
            },
            false,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn test_transform_round_trip() {
        let cam = Camera { x: 40.0, y: -25.0, k: 2.5 };
        let w = cam.screen_to_world(123.0, 77.0);
        assert!(close(cam.world_to_screen(w.0, w.1), (123.0, 77.0)));
        assert!(close(cam.world_to_screen(10.0, 10.0), (65.0, 0.0)));
    }

    #[test]
    fn test_zoom_keeps_pointer_anchor() {
        let mut cam = Camera::default();
        let before = cam.screen_to_world(300.0, 200.0);
        cam.wheel(300.0, 200.0, -1.0);
        assert!((cam.k - 1.1).abs() < 1e-12);
        assert!(close(cam.screen_to_world(300.0, 200.0), before));
    }

    #[test]
    fn test_zoom_clamped() {
        let mut cam = Camera::default();
        for _ in 0..100 {
            cam.wheel(0.0, 0.0, -1.0);
        }
        assert_eq!(cam.k, MAX_ZOOM);
        for _ in 0..200 {
            cam.wheel(0.0, 0.0, 1.0);
        }
        assert_eq!(cam.k, MIN_ZOOM);
    }

    #[test]
    fn test_animation_eases_to_target() {
        let from = Camera::default();
        let to = Camera::centered_on(100.0, 50.0, FOCUS_SCALE, 800.0, 600.0);
        let anim = CameraAnimation::new(from, to, 1000.0);

        let (start, done) = anim.sample(1000.0);
        assert_eq!(start, from);
        assert!(!done);

        let (mid, _) = anim.sample(1375.0);
        assert!((mid.k - 1.75).abs() < 1e-12);

        let (end, done) = anim.sample(1750.0);
        assert!(done);
        assert_eq!(end, to);
        assert!(close(end.world_to_screen(100.0, 50.0), (400.0, 300.0)));
    }

    #[test]
    fn test_fit_to_centers_bounds() {
        let cam = Camera::fit_to(Rect::new(0.0, 0.0, 400.0, 200.0), 800.0, 600.0, 0.0);
        assert!((cam.k - 2.0).abs() < 1e-12);
        assert!(close(cam.world_to_screen(200.0, 100.0), (400.0, 300.0)));
    }
}
