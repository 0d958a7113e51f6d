//! Reference lines: the latitude/longitude graticule, the UTM cell grid
//! and the horizon outline of disk projections.

use foundation::math::{GeoPoint, Vec2};
use projection::Projection;

/// Southern edge of the UTM latitude bands.
pub const UTM_SOUTH: f64 = -80.0;
/// Northern edge of band X.
pub const UTM_NORTH: f64 = 84.0;

/// Meridians and parallels every `spacing_deg`, sampled every `step_deg`
/// so they curve under non-cylindrical projections.
pub fn graticule_lines(spacing_deg: f64, step_deg: f64) -> Vec<Vec<GeoPoint>> {
    if !(spacing_deg > 0.0) || !(step_deg > 0.0) {
        return Vec::new();
    }
    let mut lines = Vec::new();
    let mut lon = -180.0;
    while lon < 180.0 {
        lines.push(meridian(lon, -90.0, 90.0, step_deg));
        lon += spacing_deg;
    }
    let mut lat = -90.0 + spacing_deg;
    while lat < 90.0 {
        lines.push(parallel(lat, step_deg));
        lat += spacing_deg;
    }
    lines
}

/// Zone meridians every 6 degrees and band parallels every 8 degrees
/// (band X runs to 84N).
pub fn utm_grid_lines(step_deg: f64) -> Vec<Vec<GeoPoint>> {
    if !(step_deg > 0.0) {
        return Vec::new();
    }
    let mut lines: Vec<Vec<GeoPoint>> = (0..60)
        .map(|zone| meridian(-180.0 + 6.0 * f64::from(zone), UTM_SOUTH, UTM_NORTH, step_deg))
        .collect();
    let mut lat = UTM_SOUTH;
    while lat < 72.0 + 1e-9 {
        lines.push(parallel(lat, step_deg));
        lat += 8.0;
    }
    lines.push(parallel(UTM_NORTH, step_deg));
    lines
}

fn meridian(lon: f64, south: f64, north: f64, step: f64) -> Vec<GeoPoint> {
    let n = ((north - south) / step).ceil().max(1.0) as usize;
    (0..=n)
        .map(|i| GeoPoint::new(south + (north - south) * i as f64 / n as f64, lon))
        .collect()
}

fn parallel(lat: f64, step: f64) -> Vec<GeoPoint> {
    let n = (360.0 / step).ceil().max(1.0) as usize;
    (0..=n)
        .map(|i| GeoPoint::new(lat, -180.0 + 360.0 * i as f64 / n as f64))
        .collect()
}

/// Plane-space limit circle of disk projections, closed.
pub fn horizon_outline(projection: &Projection, segments: usize) -> Option<Vec<Vec2>> {
    if projection.is_cylindrical() {
        return None;
    }
    let r = projection.limit_radius()?;
    let n = segments.max(8);
    Some(
        (0..=n)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / n as f64;
                Vec2::new(r * t.cos(), r * t.sin())
            })
            .collect(),
    )
}
