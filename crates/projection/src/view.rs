use foundation::bounds::Aabb2;
use foundation::math::Vec2;

/// Mapping between a plane-space window and a device pixel grid.
///
/// Device y grows downwards; plane y grows upwards. Row `r` covers the
/// device band `[r, r + 1)` and is sampled at its centre.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct View {
    window: Aabb2,
    width: u32,
    height: u32,
}

impl View {
    pub fn new(window: Aabb2, width: u32, height: u32) -> Self {
        Self {
            window,
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Window covering `extent` with the device aspect ratio preserved
    /// (the short side is widened, keeping the centre).
    pub fn fit(extent: Aabb2, width: u32, height: u32) -> Self {
        let (w, h) = (f64::from(width.max(1)), f64::from(height.max(1)));
        let sx = extent.width() / w;
        let sy = extent.height() / h;
        let s = sx.max(sy).max(f64::MIN_POSITIVE);
        let c = extent.center();
        let (hw, hh) = (0.5 * s * w, 0.5 * s * h);
        Self::new(Aabb2::new([c.x - hw, c.y - hh], [c.x + hw, c.y + hh]), width, height)
    }

    pub fn window(&self) -> Aabb2 {
        self.window
    }

    pub fn set_window(&mut self, window: Aabb2) {
        self.window = window;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resizes the device grid; the plane window is kept.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    /// Plane units per device pixel along x.
    pub fn scale_x(&self) -> f64 {
        self.window.width() / f64::from(self.width)
    }

    /// Plane units per device pixel along y.
    pub fn scale_y(&self) -> f64 {
        self.window.height() / f64::from(self.height)
    }

    pub fn to_device(&self, x: f64, y: f64) -> Vec2 {
        Vec2::new(
            (x - self.window.min[0]) / self.scale_x(),
            (self.window.max[1] - y) / self.scale_y(),
        )
    }

    pub fn to_plane(&self, px: f64, py: f64) -> Vec2 {
        Vec2::new(
            self.window.min[0] + px * self.scale_x(),
            self.window.max[1] - py * self.scale_y(),
        )
    }

    /// Plane y sampled by device row `row`.
    pub fn row_plane_y(&self, row: u32) -> f64 {
        self.window.max[1] - (f64::from(row) + 0.5) * self.scale_y()
    }

    /// Plane x sampled by device column `col`.
    pub fn col_plane_x(&self, col: u32) -> f64 {
        self.window.min[0] + (f64::from(col) + 0.5) * self.scale_x()
    }

    /// Device row whose centre is closest to plane `y` (may be out of range).
    pub fn plane_y_to_row(&self, y: f64) -> f64 {
        (self.window.max[1] - y) / self.scale_y() - 0.5
    }

    /// Zooms by `factor` (> 1 zooms in) keeping the plane point under the
    /// device position `about` fixed.
    pub fn zoom(&mut self, factor: f64, about: Vec2) {
        if factor <= 0.0 || !factor.is_finite() {
            return;
        }
        let anchor = self.to_plane(about.x, about.y);
        let w = self.window;
        let inv = 1.0 / factor;
        self.window = Aabb2::new(
            [
                anchor.x - (anchor.x - w.min[0]) * inv,
                anchor.y - (anchor.y - w.min[1]) * inv,
            ],
            [
                anchor.x + (w.max[0] - anchor.x) * inv,
                anchor.y + (w.max[1] - anchor.y) * inv,
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::View;
    use foundation::bounds::Aabb2;
    use foundation::math::Vec2;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn device_round_trip_and_orientation() {
        let view = View::new(Aabb2::new([-180.0, -90.0], [180.0, 90.0]), 360, 180);
        let d = view.to_device(-180.0, 90.0);
        assert_eq!(d, Vec2::new(0.0, 0.0));
        let d = view.to_device(0.0, 0.0);
        assert_eq!(d, Vec2::new(180.0, 90.0));
        let p = view.to_plane(90.0, 45.0);
        assert_close(p.x, -90.0, 1e-12);
        assert_close(p.y, 45.0, 1e-12);
        assert_close(view.row_plane_y(0), 89.5, 1e-12);
        assert_close(view.plane_y_to_row(89.5), 0.0, 1e-12);
    }

    #[test]
    fn fit_preserves_aspect() {
        let view = View::fit(Aabb2::new([-1.0, -1.0], [1.0, 1.0]), 200, 100);
        assert_close(view.scale_x(), view.scale_y(), 1e-12);
        assert_close(view.window().width(), 4.0, 1e-12);
        assert_close(view.window().height(), 2.0, 1e-12);
    }

    #[test]
    fn zoom_keeps_anchor() {
        let mut view = View::new(Aabb2::new([0.0, 0.0], [100.0, 100.0]), 100, 100);
        let about = Vec2::new(25.0, 75.0);
        let before = view.to_plane(about.x, about.y);
        view.zoom(2.0, about);
        let after = view.to_plane(about.x, about.y);
        assert_close(before.x, after.x, 1e-9);
        assert_close(before.y, after.y, 1e-9);
        assert_close(view.window().width(), 50.0, 1e-9);
    }
}
