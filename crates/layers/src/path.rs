//! Polyline projection: geographic vertices to device-space strokes.
//!
//! Cylindrical views split a segment whose endpoints lie more than half a
//! turn apart in plane x into two pieces, one leaving each side of the map.
//! Other projections break the stroke at any vertex that is not visible.

use foundation::math::{GeoPoint, Vec2};
use projection::{Projection, View};
use scene::components::LineStyle;

use crate::canvas::Surface;

/// Plane-space strokes for `points`. A closed path repeats its first vertex.
pub fn plane_strokes(points: &[GeoPoint], closed: bool, projection: &Projection) -> Vec<Vec<Vec2>> {
    let mut strokes: Vec<Vec<Vec2>> = Vec::new();
    let mut current: Vec<Vec2> = Vec::new();
    let mut prev: Option<Vec2> = None;
    let cylindrical = projection.is_cylindrical();

    let closing = closed && points.len() > 2 && points.first() != points.last();
    let iter = points.iter().chain(points.first().filter(|_| closing));

    for p in iter {
        let q = projection.project(*p);
        if !q.visible || !q.x.is_finite() || !q.y.is_finite() {
            flush(&mut strokes, &mut current);
            prev = None;
            continue;
        }
        let here = Vec2::new(q.x, q.y);
        match prev {
            None => current.push(here),
            Some(a) if cylindrical && (here.x - a.x).abs() > 180.0 => {
                let shift = if here.x > a.x { 360.0 } else { -360.0 };
                current.push(Vec2::new(here.x - shift, here.y));
                flush(&mut strokes, &mut current);
                current.push(Vec2::new(a.x + shift, a.y));
                current.push(here);
            }
            Some(_) => current.push(here),
        }
        prev = Some(here);
    }
    flush(&mut strokes, &mut current);
    strokes
}

fn flush(strokes: &mut Vec<Vec<Vec2>>, current: &mut Vec<Vec2>) {
    if current.len() >= 2 {
        strokes.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

/// Device-space strokes for `points`.
pub fn device_strokes(
    points: &[GeoPoint],
    closed: bool,
    projection: &Projection,
    view: &View,
) -> Vec<Vec<Vec2>> {
    plane_strokes(points, closed, projection)
        .into_iter()
        .map(|s| s.into_iter().map(|p| view.to_device(p.x, p.y)).collect())
        .collect()
}

/// Strokes already in device space onto `surface`; returns the segment count.
pub fn draw_strokes(surface: &mut dyn Surface, strokes: &[Vec<Vec2>], style: LineStyle) -> usize {
    let mut n = 0;
    for stroke in strokes {
        for w in stroke.windows(2) {
            surface.stroke(w[0], w[1], style);
            n += 1;
        }
    }
    n
}

/// Projects and draws a polyline; returns the segment count.
pub fn draw_path(
    surface: &mut dyn Surface,
    points: &[GeoPoint],
    closed: bool,
    projection: &Projection,
    view: &View,
    style: LineStyle,
) -> usize {
    draw_strokes(surface, &device_strokes(points, closed, projection, view), style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use projection::ProjectionKind;

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon)
    }

    #[test]
    fn dateline_segment_splits_into_two_pieces() {
        let proj = Projection::new(ProjectionKind::LinearCylindrical);
        let strokes = plane_strokes(&[p(0.0, 170.0), p(10.0, -170.0)], false, &proj);
        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[0][0], Vec2::new(170.0, 0.0));
        assert_eq!(strokes[0][1], Vec2::new(190.0, 10.0));
        assert_eq!(strokes[1][0], Vec2::new(-190.0, 0.0));
        assert_eq!(strokes[1][1], Vec2::new(-170.0, 10.0));
    }

    #[test]
    fn short_segments_stay_whole() {
        let proj = Projection::new(ProjectionKind::LinearCylindrical);
        let strokes = plane_strokes(&[p(0.0, 10.0), p(0.0, 20.0), p(5.0, 30.0)], false, &proj);
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].len(), 3);
    }

    #[test]
    fn closed_paths_return_to_start() {
        let proj = Projection::new(ProjectionKind::LinearCylindrical);
        let strokes = plane_strokes(&[p(0.0, 0.0), p(0.0, 10.0), p(10.0, 10.0)], true, &proj);
        assert_eq!(strokes[0].len(), 4);
        assert_eq!(strokes[0][0], strokes[0][3]);
    }

    #[test]
    fn hidden_vertices_break_azimuthal_strokes() {
        let proj = Projection::new(ProjectionKind::Orthographic);
        // The middle vertex is on the far hemisphere.
        let strokes = plane_strokes(
            &[p(0.0, -10.0), p(0.0, 0.0), p(0.0, 180.0), p(0.0, 10.0), p(0.0, 20.0)],
            false,
            &proj,
        );
        assert_eq!(strokes.len(), 2);
        assert!(strokes.iter().all(|s| s.len() == 2));
    }
}
