//! Contour lines over a scalar grid (marching squares).
//!
//! Output is geographic so that contours go through the same path
//! projection as every other polyline.

use foundation::math::GeoPoint;
use scene::components::ScalarGrid;

#[derive(Debug, Clone, PartialEq)]
pub struct ContourLevel {
    pub level: f64,
    pub segments: Vec<[GeoPoint; 2]>,
    /// Where the level's numeric label goes: the midpoint of its longest
    /// segment.
    pub label_at: Option<GeoPoint>,
}

impl ContourLevel {
    pub fn label(&self) -> String {
        format!("{}", self.level)
    }
}

pub fn contour_levels(grid: &ScalarGrid, levels: &[f64]) -> Vec<ContourLevel> {
    levels
        .iter()
        .filter(|l| l.is_finite())
        .map(|&level| {
            let segments = contour(grid, level);
            let label_at = segments
                .iter()
                .max_by(|a, b| seg_len(a).total_cmp(&seg_len(b)))
                .map(|[a, b]| GeoPoint::new(0.5 * (a.lat + b.lat), 0.5 * (a.lon + b.lon)));
            ContourLevel {
                level,
                segments,
                label_at,
            }
        })
        .collect()
}

fn seg_len(s: &[GeoPoint; 2]) -> f64 {
    (s[1].lat - s[0].lat).hypot(s[1].lon - s[0].lon)
}

#[derive(Copy, Clone)]
enum Edge {
    Bottom,
    Right,
    Top,
    Left,
}

/// Segments of the `level` isoline. Cells touching a missing sample are
/// skipped.
pub fn contour(grid: &ScalarGrid, level: f64) -> Vec<[GeoPoint; 2]> {
    let mut out = Vec::new();
    if grid.rows() < 2 || grid.cols() < 2 {
        return out;
    }
    for r in 0..grid.rows() - 1 {
        for c in 0..grid.cols() - 1 {
            let (Some(bl), Some(br), Some(tr), Some(tl)) = (
                grid.get(r, c),
                grid.get(r, c + 1),
                grid.get(r + 1, c + 1),
                grid.get(r + 1, c),
            ) else {
                continue;
            };
            let bit = |v: f64, b: u8| if v >= level { b } else { 0 };
            let case = bit(tl, 8) | bit(tr, 4) | bit(br, 2) | bit(bl, 1);
            let centre_high = 0.25 * (bl + br + tr + tl) >= level;

            use Edge::*;
            let pairs: &[(Edge, Edge)] = match case {
                1 | 14 => &[(Left, Bottom)],
                2 | 13 => &[(Bottom, Right)],
                3 | 12 => &[(Left, Right)],
                4 | 11 => &[(Top, Right)],
                6 | 9 => &[(Bottom, Top)],
                7 | 8 => &[(Left, Top)],
                5 if centre_high => &[(Left, Top), (Bottom, Right)],
                5 => &[(Left, Bottom), (Top, Right)],
                10 if centre_high => &[(Left, Bottom), (Top, Right)],
                10 => &[(Left, Top), (Bottom, Right)],
                _ => &[],
            };
            let cell = Cell {
                lat0: grid.lats[r],
                lat1: grid.lats[r + 1],
                lon0: grid.lons[c],
                lon1: grid.lons[c + 1],
                bl,
                br,
                tr,
                tl,
                level,
            };
            for &(a, b) in pairs {
                out.push([cell.point(a), cell.point(b)]);
            }
        }
    }
    out
}

struct Cell {
    lat0: f64,
    lat1: f64,
    lon0: f64,
    lon1: f64,
    bl: f64,
    br: f64,
    tr: f64,
    tl: f64,
    level: f64,
}

impl Cell {
    fn t(&self, va: f64, vb: f64) -> f64 {
        if va == vb { 0.5 } else { (self.level - va) / (vb - va) }
    }

    fn point(&self, edge: Edge) -> GeoPoint {
        let lerp = |a: f64, b: f64, t: f64| a + (b - a) * t;
        match edge {
            Edge::Bottom => GeoPoint::new(self.lat0, lerp(self.lon0, self.lon1, self.t(self.bl, self.br))),
            Edge::Top => GeoPoint::new(self.lat1, lerp(self.lon0, self.lon1, self.t(self.tl, self.tr))),
            Edge::Left => GeoPoint::new(lerp(self.lat0, self.lat1, self.t(self.bl, self.tl)), self.lon0),
            Edge::Right => GeoPoint::new(lerp(self.lat0, self.lat1, self.t(self.br, self.tr)), self.lon1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak() -> ScalarGrid {
        ScalarGrid {
            lats: vec![0.0, 10.0, 20.0],
            lons: vec![0.0, 10.0, 20.0],
            values: vec![0.0, 0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 0.0],
            no_data: None,
        }
    }

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn single_peak_gives_a_closed_diamond() {
        let segs = contour(&peak(), 5.0);
        assert_eq!(segs.len(), 4);
        for [a, b] in &segs {
            for p in [a, b] {
                // Every crossing sits halfway between the peak and a neighbour.
                let on_axis = (p.lat - 10.0).abs() < 1e-9 || (p.lon - 10.0).abs() < 1e-9;
                assert!(on_axis, "{p:?}");
                assert_close((p.lat - 10.0).abs() + (p.lon - 10.0).abs(), 5.0, 1e-9);
            }
        }
    }

    #[test]
    fn interpolation_follows_the_level() {
        let segs = contour(&peak(), 2.5);
        let p = segs
            .iter()
            .flat_map(|s| s.iter())
            .find(|p| (p.lat - 10.0).abs() < 1e-9 && p.lon < 10.0)
            .copied()
            .unwrap();
        assert_close(p.lon, 2.5, 1e-9);
    }

    #[test]
    fn missing_samples_skip_cells() {
        let mut grid = peak();
        grid.no_data = Some(-1.0);
        grid.values[0] = -1.0;
        assert_eq!(contour(&grid, 5.0).len(), 3);
    }

    #[test]
    fn saddles_follow_the_centre_value() {
        let grid = ScalarGrid {
            lats: vec![0.0, 1.0],
            lons: vec![0.0, 1.0],
            values: vec![10.0, 0.0, 0.0, 10.0],
            no_data: None,
        };
        // bl and tr high, centre 5 >= 5: the high diagonal stays connected.
        let segs = contour(&grid, 5.0);
        assert_eq!(segs.len(), 2);
        assert_close(segs[0][0].lon, 0.0, 1e-12);
        assert_close(segs[0][1].lat, 1.0, 1e-12);
    }

    #[test]
    fn levels_carry_labels() {
        let levels = contour_levels(&peak(), &[5.0, 50.0]);
        assert_eq!(levels.len(), 2);
        assert!(levels[0].label_at.is_some());
        assert_eq!(levels[0].label(), "5");
        assert!(levels[1].segments.is_empty());
        assert!(levels[1].label_at.is_none());
    }
}
