//! Picking a UTM cell from the flat UTM display and switching to the
//! ellipsoidal projection of that cell.

use foundation::math::GeoPoint;
use projection::{Projection, ProjectionKind, UtmCell, View};
use tracing::info;

/// Cell under device point `(x, y)`.
pub fn cell_under(projection: &Projection, view: &View, x: f64, y: f64) -> Option<UtmCell> {
    let p = view.to_plane(x, y);
    UtmCell::containing(projection.unproject(p.x, p.y)?)
}

/// Closed boundary of `cell`, sampled every `step_deg` along each edge.
pub fn cell_outline(cell: UtmCell, step_deg: f64) -> Vec<GeoPoint> {
    let (s, n) = cell.lat_band();
    let (w, e) = cell.lon_band();
    let corners = [
        GeoPoint::new(s, w),
        GeoPoint::new(s, e),
        GeoPoint::new(n, e),
        GeoPoint::new(n, w),
        GeoPoint::new(s, w),
    ];
    let mut ring = Vec::new();
    for pair in corners.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let span = (b.lat - a.lat).abs().max((b.lon - a.lon).abs());
        let n = (span / step_deg.max(1e-3)).ceil().max(1.0) as usize;
        for i in 0..n {
            let t = i as f64 / n as f64;
            ring.push(GeoPoint::new(a.lat + (b.lat - a.lat) * t, a.lon + (b.lon - a.lon) * t));
        }
    }
    ring.push(corners[0]);
    ring
}

/// Switches to UTM-near projection of `cell` and fits the view to it.
pub fn enter_cell(projection: &mut Projection, view: &mut View, cell: UtmCell) {
    projection.set_utm_cell(cell);
    projection.set_kind(ProjectionKind::UtmNear);
    *view = View::fit(projection.plane_extent(), view.width(), view.height());
    info!(cell = %cell.label(), "entered utm cell");
}

/// Back to the flat UTM display, centred on the cell just left.
pub fn leave_cell(projection: &mut Projection, view: &mut View) {
    let center = projection.utm_cell().map(|c| c.center());
    projection.set_kind(ProjectionKind::Utm);
    if let Some(c) = center {
        projection.recenter(c);
    }
    *view = View::fit(projection.plane_extent(), view.width(), view.height());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat() -> (Projection, View) {
        let proj = Projection::new(ProjectionKind::Utm);
        let view = View::fit(proj.plane_extent(), 360, 180);
        (proj, view)
    }

    #[test]
    fn finds_the_cell_under_the_cursor() {
        let (proj, view) = flat();
        let d = view.to_device(3.0, 45.0);
        let cell = cell_under(&proj, &view, d.x, d.y).unwrap();
        assert_eq!(cell.label(), "31T");
        // Beyond the 84N limit of the grid.
        let d = view.to_device(3.0, 86.0);
        assert!(cell_under(&proj, &view, d.x, d.y).is_none());
    }

    #[test]
    fn entering_and_leaving_a_cell() {
        let (mut proj, mut view) = flat();
        let cell: UtmCell = "33U".parse().unwrap();
        enter_cell(&mut proj, &mut view, cell);
        assert_eq!(proj.kind(), ProjectionKind::UtmNear);
        assert_eq!(proj.utm_cell(), Some(cell));
        let q = proj.project(cell.center());
        assert!(q.visible);
        assert!(view.window().contains(foundation::math::Vec2::new(q.x, q.y)));
        assert_eq!((view.width(), view.height()), (360, 180));

        leave_cell(&mut proj, &mut view);
        assert_eq!(proj.kind(), ProjectionKind::Utm);
        assert!((proj.lon_center() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn outline_is_a_closed_rectangle() {
        let cell: UtmCell = "31T".parse().unwrap();
        let ring = cell_outline(cell, 1.0);
        assert_eq!(ring.first(), ring.last());
        // 6 + 8 + 6 + 8 one-degree steps plus the closing vertex.
        assert_eq!(ring.len(), 29);
        assert!(ring.iter().all(|p| (0.0..=6.0).contains(&p.lon) && (40.0..=48.0).contains(&p.lat)));
    }
}
