//! Scan conversion of filled shapes into device row spans.
//!
//! Every ring edge that straddles a row centre contributes a crossing
//! tagged by its direction in plane y: a descending edge (`Down`) opens a
//! span and an ascending one (`Up`) closes it, so a counter-clockwise outer
//! ring starts each row with `Down` and clockwise holes cut gaps out of it.
//!
//! Cylindrical rings are unwrapped into a continuous longitude chain;
//! crossings are then folded back into the map's longitude window, and a
//! row whose crossings were folded may start inside the shape, in which
//! case its first span runs from the left edge of the map and its last one
//! to the right edge.
//!
//! A ring winding once around a pole is closed through that pole.
//!
//! A shape none of whose rows starts with `Down` is reversed once and
//! scanned again. If it is still backward it is not filled.

use std::ops::Range;

use foundation::math::{
    GeoPoint, PLANE_EPSILON, Vec2, lon_delta, normalize_lon, stable_total_cmp_f64,
};
use projection::{Projection, ProjectionKind, View};

use crate::canvas::Span;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Down,
    Up,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Crossing {
    pub x: f64,
    pub dir: Direction,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    /// Nothing of the shape falls on any row.
    Empty,
    Filled,
    /// Wound backwards; filled after reversing its rings.
    Reversed,
    /// Still backward after reversal; not filled.
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub spans: Vec<Span>,
    pub outcome: FillOutcome,
}

impl Fill {
    fn empty(outcome: FillOutcome) -> Self {
        Self {
            spans: Vec::new(),
            outcome,
        }
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        self.spans.iter().any(|s| s.contains(row, col))
    }

    pub fn pixel_count(&self) -> u64 {
        self.spans.iter().map(|s| u64::from(s.len())).sum()
    }
}

/// Fills a shape given as geographic rings (outer rings counter-clockwise,
/// holes clockwise).
pub fn fill_shape(parts: &[Vec<GeoPoint>], projection: &Projection, view: &View) -> Fill {
    fill_plane_rings(plane_rings(parts, projection), projection, view)
}

/// Whether device pixel `(col, row)` is covered by the shape's fill.
///
/// Orientation is decided over every row the shape touches, exactly as
/// [`fill_shape`] does; only the pixel's row is then walked.
pub fn covers(parts: &[Vec<GeoPoint>], projection: &Projection, view: &View, col: u32, row: u32) -> bool {
    if col >= view.width() || row >= view.height() {
        return false;
    }
    let Ok((rows, table, _)) = oriented_table(plane_rings(parts, projection), view) else {
        return false;
    };
    if !rows.contains(&row) {
        return false;
    }
    let Some(crossings) = table.into_iter().nth((row - rows.start) as usize) else {
        return false;
    };
    let window = Window::for_projection(projection, view);
    let mut spans = Vec::new();
    scan_row(&window, view, row, crossings, &mut spans);
    spans.iter().any(|s| s.contains(row, col))
}

/// Projects rings to the plane as explicitly closed polylines.
pub fn plane_rings(parts: &[Vec<GeoPoint>], projection: &Projection) -> Vec<Vec<Vec2>> {
    parts
        .iter()
        .map(|part| open_ring(part))
        .filter(|ring| ring.len() >= 3)
        .map(|ring| {
            if projection.is_cylindrical() {
                cylindrical_ring(ring, projection)
            } else if let Some(radius) = projection.limit_radius() {
                disk_ring(ring, projection, radius)
            } else {
                visible_ring(ring, projection)
            }
        })
        .filter(|ring| ring.len() >= 4)
        .collect()
}

fn open_ring(part: &[GeoPoint]) -> &[GeoPoint] {
    match (part.first(), part.last()) {
        (Some(a), Some(b)) if part.len() > 1 && a.approx_eq(*b, 1e-12) => &part[..part.len() - 1],
        _ => part,
    }
}

/// Continuous longitude chain starting inside the map's window.
///
/// A ring that winds once around a pole ends a full turn away from where it
/// started; it is closed along the map edge at the pole its vertices lean
/// towards, so the cap becomes part of the shape.
fn cylindrical_ring(ring: &[GeoPoint], projection: &Projection) -> Vec<Vec2> {
    let mut out = Vec::with_capacity(ring.len() + 3);
    let start = normalize_lon(ring[0].lon, projection.lon_center());
    let start_y = projection.forward_y(ring[0].lat);
    let mut x = start;
    out.push(Vec2::new(x, start_y));
    for w in ring.windows(2) {
        x += lon_delta(w[0].lon, w[1].lon);
        out.push(Vec2::new(x, projection.forward_y(w[1].lat)));
    }
    let last = ring[ring.len() - 1];
    x += lon_delta(last.lon, ring[0].lon);
    out.push(Vec2::new(x, start_y));
    if (x - start).abs() > 180.0 {
        let mean_lat = ring.iter().map(|p| p.lat).sum::<f64>() / ring.len() as f64;
        let pole_y = projection.forward_y(if mean_lat < 0.0 { -90.0 } else { 90.0 });
        out.push(Vec2::new(x, pole_y));
        out.push(Vec2::new(start, pole_y));
        out.push(Vec2::new(start, start_y));
    }
    out
}

/// Hidden vertices are pulled onto the limit circle along their azimuth.
fn disk_ring(ring: &[GeoPoint], projection: &Projection, radius: f64) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = Vec::with_capacity(ring.len() + 1);
    for p in ring {
        let q = projection.project(*p);
        if !q.x.is_finite() || !q.y.is_finite() {
            continue;
        }
        let mut v = Vec2::new(q.x, q.y);
        if !q.visible {
            let r = v.length();
            if r <= PLANE_EPSILON {
                continue;
            }
            v = v.scale(radius / r);
        }
        out.push(v);
    }
    if let Some(first) = out.first().copied() {
        out.push(first);
    }
    out
}

fn visible_ring(ring: &[GeoPoint], projection: &Projection) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = ring
        .iter()
        .map(|p| projection.project(*p))
        .filter(|q| q.visible && q.x.is_finite() && q.y.is_finite())
        .map(|q| Vec2::new(q.x, q.y))
        .collect();
    if let Some(first) = out.first().copied() {
        out.push(first);
    }
    out
}

/// Core scan conversion over plane-space rings.
pub fn fill_plane_rings(rings: Vec<Vec<Vec2>>, projection: &Projection, view: &View) -> Fill {
    let (rows, table, outcome) = match oriented_table(rings, view) {
        Ok(oriented) => oriented,
        Err(outcome) => return Fill::empty(outcome),
    };
    let window = Window::for_projection(projection, view);
    let mut spans = Vec::new();
    for (row, crossings) in rows.zip(table) {
        scan_row(&window, view, row, crossings, &mut spans);
    }
    Fill { spans, outcome }
}

/// Crossing table over every row the rings touch, reversed once when the
/// shape reads as backward. Fails with `Empty` or `Skipped`.
fn oriented_table(
    mut rings: Vec<Vec<Vec2>>,
    view: &View,
) -> Result<(Range<u32>, Vec<Vec<Crossing>>, FillOutcome), FillOutcome> {
    let Some(rows) = row_range(&rings, view) else {
        return Err(FillOutcome::Empty);
    };
    let table = crossing_table(&rings, view, rows.clone());
    if !is_backward(&table) {
        return Ok((rows, table, FillOutcome::Filled));
    }
    for ring in &mut rings {
        ring.reverse();
    }
    let table = crossing_table(&rings, view, rows.clone());
    if is_backward(&table) {
        return Err(FillOutcome::Skipped);
    }
    Ok((rows, table, FillOutcome::Reversed))
}

fn scan_row(window: &Window, view: &View, row: u32, mut crossings: Vec<Crossing>, spans: &mut Vec<Span>) {
    if crossings.is_empty() {
        return;
    }
    let y = view.row_plane_y(row);
    let wrapped = window.fold(&mut crossings);
    for (a, b) in walk(&crossings, wrapped, window.left, window.right) {
        let Some((a, b)) = window.clip(a, b, y) else {
            continue;
        };
        if let Some(span) = device_span(view, row, a, b, y) {
            spans.push(span);
        }
    }
}

fn row_range(rings: &[Vec<Vec2>], view: &View) -> Option<Range<u32>> {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in rings.iter().flatten() {
        lo = lo.min(p.y);
        hi = hi.max(p.y);
    }
    if !(lo.is_finite() && hi.is_finite()) || view.height() == 0 {
        return None;
    }
    let last_row = f64::from(view.height() - 1);
    let top = view.plane_y_to_row(hi).floor().max(0.0);
    let bottom = view.plane_y_to_row(lo).ceil().min(last_row);
    if top > bottom {
        return None;
    }
    Some(top as u32..bottom as u32 + 1)
}

/// Crossings per row of `rows`, each list sorted by x. On equal x an `Up`
/// sorts before a `Down`, so zero-width slivers read as backward.
pub fn crossing_table(rings: &[Vec<Vec2>], view: &View, rows: Range<u32>) -> Vec<Vec<Crossing>> {
    let mut table: Vec<Vec<Crossing>> = vec![Vec::new(); rows.len()];
    let first = f64::from(rows.start);
    let last = f64::from(rows.end.saturating_sub(1));
    for ring in rings {
        for w in ring.windows(2) {
            let (a, b) = (w[0], w[1]);
            if a.y == b.y {
                continue;
            }
            let (lo, hi) = if a.y < b.y { (a.y, b.y) } else { (b.y, a.y) };
            let r0 = (view.plane_y_to_row(hi).floor() - 1.0).max(first);
            let r1 = (view.plane_y_to_row(lo).ceil() + 1.0).min(last);
            if r0 > r1 {
                continue;
            }
            for row in r0 as u32..=r1 as u32 {
                let y = view.row_plane_y(row);
                // Half-open in y: a vertex lying exactly on a row centre
                // counts for the edge above it only.
                let dir = if a.y <= y && y < b.y {
                    Direction::Up
                } else if b.y <= y && y < a.y {
                    Direction::Down
                } else {
                    continue;
                };
                let x = a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y);
                table[(row - rows.start) as usize].push(Crossing { x, dir });
            }
        }
    }
    for row in &mut table {
        sort_crossings(row);
    }
    table
}

fn sort_crossings(row: &mut [Crossing]) {
    row.sort_by(|a, b| {
        stable_total_cmp_f64(a.x, b.x).then_with(|| match (a.dir, b.dir) {
            (Direction::Up, Direction::Down) => std::cmp::Ordering::Less,
            (Direction::Down, Direction::Up) => std::cmp::Ordering::Greater,
            _ => std::cmp::Ordering::Equal,
        })
    });
}

/// True when rows were crossed but none of them starts with `Down`.
pub fn is_backward(table: &[Vec<Crossing>]) -> bool {
    let mut crossed = false;
    for row in table {
        match row.first() {
            Some(c) if c.dir == Direction::Down => return false,
            Some(_) => crossed = true,
            None => {}
        }
    }
    crossed
}

/// Plane-x intervals covered on one row.
///
/// Winding counts `Down` as +1 and `Up` as -1. A row with folded crossings
/// may begin inside the shape: it starts with whatever winding keeps the
/// running count non-negative, open at `left`, and a span still open at the
/// end runs to `right`. Unfolded rows start outside and drop unmatched
/// crossings.
pub fn walk(crossings: &[Crossing], wrapped: bool, left: f64, right: f64) -> Vec<(f64, f64)> {
    let mut winding: i32 = 0;
    if wrapped {
        let mut sum = 0;
        for c in crossings {
            sum += match c.dir {
                Direction::Down => 1,
                Direction::Up => -1,
            };
            winding = winding.max(-sum);
        }
    }
    let mut start = (winding > 0).then_some(left);
    let mut out = Vec::new();
    for c in crossings {
        match c.dir {
            Direction::Down => {
                if winding == 0 {
                    start = Some(c.x);
                }
                winding += 1;
            }
            Direction::Up => {
                if winding == 0 {
                    continue;
                }
                winding -= 1;
                if winding == 0
                    && let Some(s) = start.take()
                {
                    out.push((s, c.x));
                }
            }
        }
    }
    if wrapped
        && winding > 0
        && let Some(s) = start
    {
        out.push((s, right));
    }
    out
}

/// Horizontal extent of the map in plane units and the clipping it implies.
struct Window {
    left: f64,
    right: f64,
    cylindrical: Option<f64>,
    disk: Option<f64>,
}

impl Window {
    fn for_projection(projection: &Projection, view: &View) -> Self {
        if projection.is_cylindrical() {
            let c = projection.lon_center();
            return Self {
                left: c - 180.0,
                right: c + 180.0,
                cylindrical: Some(c),
                disk: None,
            };
        }
        let w = view.window();
        let disk = match projection.kind() {
            ProjectionKind::UtmNear => None,
            _ => projection.limit_radius(),
        };
        Self {
            left: w.min[0],
            right: w.max[0],
            cylindrical: None,
            disk,
        }
    }

    /// Folds cylindrical crossings into the longitude window and re-sorts.
    /// Returns whether any crossing moved.
    fn fold(&self, crossings: &mut [Crossing]) -> bool {
        let Some(center) = self.cylindrical else {
            return false;
        };
        let mut moved = false;
        for c in crossings.iter_mut() {
            let x = normalize_lon(c.x, center);
            if (x - c.x).abs() > PLANE_EPSILON {
                c.x = x;
                moved = true;
            }
        }
        if moved {
            sort_crossings(crossings);
        }
        moved
    }

    fn clip(&self, a: f64, b: f64, y: f64) -> Option<(f64, f64)> {
        let (mut a, mut b) = (a, b);
        if let Some(r) = self.disk {
            if y.abs() >= r {
                return None;
            }
            let hw = (r * r - y * y).sqrt();
            a = a.max(-hw);
            b = b.min(hw);
        }
        (a <= b).then_some((a, b))
    }
}

/// Columns whose pixel centres fall within plane `[a, b]`.
fn device_span(view: &View, row: u32, a: f64, b: f64, y: f64) -> Option<Span> {
    if view.width() == 0 {
        return None;
    }
    let da = view.to_device(a, y).x;
    let db = view.to_device(b, y).x;
    let c0 = (da - 0.5).ceil().max(0.0);
    let c1 = (db - 0.5).floor().min(f64::from(view.width() - 1));
    (c0 <= c1).then(|| Span::new(row, c0 as u32, c1 as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::bounds::Aabb2;
    use pretty_assertions::assert_eq;

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon)
    }

    /// One pixel per degree over the whole linear-cylindrical plane.
    fn world_view() -> (Projection, View) {
        let proj = Projection::new(ProjectionKind::LinearCylindrical);
        let view = View::new(Aabb2::new([-180.0, -90.0], [180.0, 90.0]), 360, 180);
        (proj, view)
    }

    fn square(lat0: f64, lon0: f64, lat1: f64, lon1: f64) -> Vec<GeoPoint> {
        vec![p(lat0, lon0), p(lat0, lon1), p(lat1, lon1), p(lat1, lon0)]
    }

    #[test]
    fn counter_clockwise_square_fills_exact_pixels() {
        let (proj, view) = world_view();
        let fill = fill_shape(&[square(0.0, 0.0, 10.0, 10.0)], &proj, &view);
        assert_eq!(fill.outcome, FillOutcome::Filled);
        assert_eq!(fill.spans.len(), 10);
        for (i, span) in fill.spans.iter().enumerate() {
            assert_eq!(*span, Span::new(80 + i as u32, 180, 189));
        }
        assert_eq!(fill.pixel_count(), 100);
    }

    #[test]
    fn clockwise_square_is_reversed_once() {
        let (proj, view) = world_view();
        let mut ring = square(0.0, 0.0, 10.0, 10.0);
        ring.reverse();
        let fill = fill_shape(&[ring], &proj, &view);
        assert_eq!(fill.outcome, FillOutcome::Reversed);
        assert_eq!(fill.pixel_count(), 100);
    }

    #[test]
    fn closing_duplicate_vertex_is_ignored() {
        let (proj, view) = world_view();
        let mut ring = square(0.0, 0.0, 10.0, 10.0);
        ring.push(ring[0]);
        let fill = fill_shape(&[ring], &proj, &view);
        assert_eq!(fill.pixel_count(), 100);
    }

    #[test]
    fn dateline_shape_fills_both_map_edges() {
        let (proj, view) = world_view();
        let ring = vec![p(0.0, 170.0), p(0.0, -170.0), p(10.0, -170.0), p(10.0, 170.0)];
        let fill = fill_shape(&[ring], &proj, &view);
        assert_eq!(fill.outcome, FillOutcome::Filled);
        assert_eq!(fill.spans.len(), 20);
        for row in 80..90 {
            let on_row: Vec<Span> = fill.spans.iter().copied().filter(|s| s.row == row).collect();
            assert_eq!(on_row, vec![Span::new(row, 0, 9), Span::new(row, 350, 359)]);
        }
    }

    #[test]
    fn holes_cut_gaps() {
        let (proj, view) = world_view();
        let outer = square(0.0, 0.0, 20.0, 20.0);
        let mut hole = square(5.0, 5.0, 15.0, 15.0);
        hole.reverse();
        let fill = fill_shape(&[outer, hole], &proj, &view);
        assert_eq!(fill.outcome, FillOutcome::Filled);
        assert_eq!(fill.pixel_count(), 400 - 100);
        assert!(fill.contains(80, 182));
        assert!(!fill.contains(80, 190));
        assert!(fill.contains(80, 197));
    }

    #[test]
    fn recentred_window_moves_fill() {
        let mut proj = Projection::new(ProjectionKind::LinearCylindrical);
        proj.set_rotation(180.0, 0.0);
        let view = View::new(Aabb2::new([-360.0, -90.0], [0.0, 90.0]), 360, 180);
        let ring = vec![p(0.0, 170.0), p(0.0, -170.0), p(10.0, -170.0), p(10.0, 170.0)];
        let fill = fill_shape(&[ring], &proj, &view);
        // Centred on the dateline the shape is contiguous.
        assert_eq!(fill.spans.len(), 10);
        assert_eq!(fill.spans[0], Span::new(80, 170, 189));
    }

    #[test]
    fn mercator_rows_follow_the_y_law() {
        let proj = Projection::new(ProjectionKind::Mercator);
        let view = View::fit(proj.plane_extent(), 200, 200);
        let fill = fill_shape(&[square(0.0, -30.0, 60.0, 30.0)], &proj, &view);
        let top = proj.forward_y(60.0);
        for span in &fill.spans {
            let y = view.row_plane_y(span.row);
            assert!(y >= 0.0 && y < top);
        }
        assert!(!fill.spans.is_empty());
    }

    #[test]
    fn orthographic_spans_stay_inside_the_horizon() {
        let proj = Projection::new(ProjectionKind::Orthographic);
        let view = View::fit(proj.plane_extent(), 101, 101);
        // Wider than the visible hemisphere: the far vertices are clamped.
        let ring = vec![p(-60.0, -150.0), p(-60.0, 150.0), p(60.0, 150.0), p(60.0, -150.0)];
        let fill = fill_shape(&[ring], &proj, &view);
        assert!(fill.outcome != FillOutcome::Skipped);
        let center = view.to_device(0.0, 0.0);
        let radius = view.to_device(1.0, 0.0).x - center.x;
        for span in &fill.spans {
            for col in [span.x0, span.x1] {
                let dx = f64::from(col) + 0.5 - center.x;
                let dy = f64::from(span.row) + 0.5 - center.y;
                assert!(dx.hypot(dy) <= radius + 1.0);
            }
        }
    }

    #[test]
    fn zero_width_sliver_is_skipped_after_one_retry() {
        let (proj, view) = world_view();
        let sliver = vec![p(0.0, 0.0), p(10.0, 0.0), p(5.0, 0.0)];
        let fill = fill_shape(&[sliver], &proj, &view);
        assert_eq!(fill.outcome, FillOutcome::Skipped);
        assert!(fill.spans.is_empty());
    }

    /// A self-intersecting ring with one forward and one backward lobe is
    /// not reversed (some rows start with `Down`) and its backward lobe is
    /// left unfilled.
    #[test]
    fn backward_lobe_of_a_bowtie_stays_unfilled() {
        let (proj, view) = world_view();
        let bowtie = vec![p(0.0, 0.0), p(10.0, 10.0), p(0.0, 10.0), p(10.0, 0.0)];
        let fill = fill_shape(&[bowtie], &proj, &view);
        assert_eq!(fill.outcome, FillOutcome::Filled);
        assert!(!fill.spans.is_empty());
        for span in &fill.spans {
            assert!(span.x0 >= 180 && span.x1 <= 185, "{span:?}");
        }
    }

    #[test]
    fn shapes_off_screen_are_empty() {
        let proj = Projection::new(ProjectionKind::LinearCylindrical);
        let view = View::new(Aabb2::new([-10.0, -10.0], [10.0, 10.0]), 20, 20);
        let fill = fill_shape(&[square(40.0, 0.0, 50.0, 5.0)], &proj, &view);
        assert_eq!(fill.outcome, FillOutcome::Empty);
    }

    #[test]
    fn single_row_cover_matches_the_full_fill() {
        let (proj, view) = world_view();
        let ring = vec![p(0.0, 170.0), p(0.0, -170.0), p(10.0, -170.0), p(10.0, 170.0)];
        let parts = [ring];
        let fill = fill_shape(&parts, &proj, &view);
        for (col, row) in [(5, 85), (355, 80), (180, 85), (5, 95)] {
            assert_eq!(covers(&parts, &proj, &view, col, row), fill.contains(row, col), "{col},{row}");
        }
        assert!(covers(&parts, &proj, &view, 5, 85));
    }

    fn south_polar_ring() -> Vec<GeoPoint> {
        vec![p(-70.0, -180.0), p(-65.0, -90.0), p(-70.0, 0.0), p(-65.0, 90.0)]
    }

    #[test]
    fn ring_around_a_pole_fills_its_cap() {
        let (proj, view) = world_view();
        let eastward = south_polar_ring();
        let mut westward = eastward.clone();
        westward.reverse();
        for (ring, outcome) in [(eastward, FillOutcome::Reversed), (westward, FillOutcome::Filled)] {
            let fill = fill_shape(&[ring], &proj, &view);
            assert_eq!(fill.outcome, outcome);
            for row in 160..180 {
                for col in [0, 90, 180, 359] {
                    assert!(fill.contains(row, col), "{row},{col}");
                }
            }
            // Between the zigzag's crests only the part south of it is inside.
            assert!(fill.contains(157, 90));
            assert!(!fill.contains(157, 0));
            assert!(!fill.contains(157, 180));
            assert!(!fill.contains(150, 180));
        }
    }

    #[test]
    fn northern_cap_closes_through_the_north_pole() {
        let (proj, view) = world_view();
        let ring: Vec<GeoPoint> = south_polar_ring().iter().map(|q| p(-q.lat, q.lon)).collect();
        let fill = fill_shape(&[ring], &proj, &view);
        assert!(fill.outcome != FillOutcome::Skipped);
        for row in 0..20 {
            assert!(fill.contains(row, 0) && fill.contains(row, 359), "{row}");
        }
        assert!(!fill.contains(30, 180));
    }

    /// The lower lobe's rows start with `Up` on their own, but the shape as
    /// a whole is forward, so that lobe stays empty in both answers.
    #[test]
    fn cover_uses_the_orientation_of_the_whole_shape() {
        let (proj, view) = world_view();
        let bowtie = vec![p(0.0, 0.0), p(10.0, 10.0), p(10.0, 0.0), p(0.0, 10.0)];
        let parts = [bowtie];
        let fill = fill_shape(&parts, &proj, &view);
        assert_eq!(fill.outcome, FillOutcome::Filled);
        assert!(fill.contains(82, 185));
        assert!(!fill.contains(87, 185));
        assert!(covers(&parts, &proj, &view, 185, 82));
        assert!(!covers(&parts, &proj, &view, 185, 87));

        let cap = [south_polar_ring()];
        let fill = fill_shape(&cap, &proj, &view);
        for (col, row) in [(0, 157), (90, 157), (180, 157), (5, 170), (200, 150)] {
            assert_eq!(covers(&cap, &proj, &view, col, row), fill.contains(row, col), "{col},{row}");
        }
    }

    #[test]
    fn walk_handles_folded_rows() {
        let up = |x| Crossing { x, dir: Direction::Up };
        let down = |x| Crossing { x, dir: Direction::Down };
        assert_eq!(
            walk(&[up(-170.0), down(170.0)], true, -180.0, 180.0),
            vec![(-180.0, -170.0), (170.0, 180.0)]
        );
        assert!(walk(&[up(-170.0), down(170.0)], false, -180.0, 180.0).is_empty());
        assert_eq!(
            walk(&[down(0.0), down(2.0), up(5.0), up(8.0)], false, -180.0, 180.0),
            vec![(0.0, 8.0)]
        );
    }
}
