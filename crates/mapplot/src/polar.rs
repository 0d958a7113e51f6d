//! Polar selection wedge: an annular sector around the polar projection's
//! pole, given by a centre azimuth, a half width and a distance band.

use foundation::math::{GeoPoint, Vec2, distance_azimuth, lon_delta, point_segment_distance_squared};
use projection::{Projection, View};
use scene::{MapWorld, ObjectRef};
use serde::{Deserialize, Serialize};

/// Smallest width (degrees of azimuth or distance) a resize can leave.
const MIN_EXTENT_DEG: f64 = 0.5;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PolarHandle {
    Inner,
    Outer,
    /// Edge at the smaller azimuth.
    Start,
    /// Edge at the larger azimuth.
    End,
    Interior,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarSelection {
    pub azimuth_deg: f64,
    pub half_width_deg: f64,
    pub inner_deg: f64,
    pub outer_deg: f64,
}

/// `(distance, azimuth)` of a polar-plane point; azimuth clockwise from
/// north in (-180, 180].
pub fn polar_coords(v: Vec2) -> (f64, f64) {
    (v.x.hypot(v.y), v.x.atan2(v.y).to_degrees())
}

fn polar_point(dist: f64, az_deg: f64) -> Vec2 {
    let a = az_deg.to_radians();
    Vec2::new(dist * a.sin(), dist * a.cos())
}

impl PolarSelection {
    pub fn new(azimuth_deg: f64, half_width_deg: f64, inner_deg: f64, outer_deg: f64) -> Self {
        let inner = inner_deg.clamp(0.0, 180.0 - MIN_EXTENT_DEG);
        Self {
            azimuth_deg: lon_delta(0.0, azimuth_deg),
            half_width_deg: half_width_deg.clamp(0.5 * MIN_EXTENT_DEG, 180.0),
            inner_deg: inner,
            outer_deg: outer_deg.clamp(inner + MIN_EXTENT_DEG, 180.0),
        }
    }

    pub fn start_azimuth(&self) -> f64 {
        self.azimuth_deg - self.half_width_deg
    }

    pub fn end_azimuth(&self) -> f64 {
        self.azimuth_deg + self.half_width_deg
    }

    pub fn contains_polar(&self, dist: f64, az_deg: f64) -> bool {
        dist >= self.inner_deg
            && dist <= self.outer_deg
            && lon_delta(self.azimuth_deg, az_deg).abs() <= self.half_width_deg
    }

    pub fn contains(&self, pole: GeoPoint, p: GeoPoint) -> bool {
        let d = distance_azimuth(pole, p);
        self.contains_polar(d.delta, d.az)
    }

    fn arc(&self, dist: f64, step_deg: f64) -> Vec<Vec2> {
        let n = ((2.0 * self.half_width_deg) / step_deg).ceil().max(1.0) as usize;
        (0..=n)
            .map(|i| polar_point(dist, self.start_azimuth() + 2.0 * self.half_width_deg * i as f64 / n as f64))
            .collect()
    }

    fn radial(&self, az: f64) -> Vec<Vec2> {
        vec![polar_point(self.inner_deg, az), polar_point(self.outer_deg, az)]
    }

    /// Closed outline in polar-plane coordinates.
    pub fn outline(&self, step_deg: f64) -> Vec<Vec2> {
        let mut ring = self.arc(self.outer_deg, step_deg);
        let mut inner = self.arc(self.inner_deg, step_deg);
        inner.reverse();
        ring.extend(inner);
        if let Some(first) = ring.first().copied() {
            ring.push(first);
        }
        ring
    }

    /// Handle within `tol_px` of device point `(x, y)`, nearest first; the
    /// interior when no edge is close but the point is inside.
    pub fn handle_at(&self, view: &View, x: f64, y: f64, tol_px: f64) -> Option<(PolarHandle, f64)> {
        let cursor = Vec2::new(x, y);
        let edges = [
            (PolarHandle::Outer, self.arc(self.outer_deg, 2.0)),
            (PolarHandle::Inner, self.arc(self.inner_deg, 2.0)),
            (PolarHandle::Start, self.radial(self.start_azimuth())),
            (PolarHandle::End, self.radial(self.end_azimuth())),
        ];
        let mut best: Option<(PolarHandle, f64)> = None;
        for (handle, edge) in edges {
            let device: Vec<Vec2> = edge.iter().map(|p| view.to_device(p.x, p.y)).collect();
            for w in device.windows(2) {
                let d = point_segment_distance_squared(cursor, w[0], w[1]).sqrt();
                if d <= tol_px && best.is_none_or(|(_, b)| d < b) {
                    best = Some((handle, d));
                }
            }
        }
        if best.is_some() {
            return best;
        }
        let p = view.to_plane(x, y);
        let (dist, az) = polar_coords(p);
        self.contains_polar(dist, az).then_some((PolarHandle::Interior, 0.0))
    }

    /// Moves one edge to the polar-plane position `(dist, az)`.
    pub fn resize(&mut self, handle: PolarHandle, dist: f64, az_deg: f64) {
        match handle {
            PolarHandle::Outer => {
                self.outer_deg = dist.clamp(self.inner_deg + MIN_EXTENT_DEG, 180.0);
            }
            PolarHandle::Inner => {
                self.inner_deg = dist.clamp(0.0, self.outer_deg - MIN_EXTENT_DEG);
            }
            PolarHandle::Start => {
                let end = self.end_azimuth();
                let width = (end - az_deg).rem_euclid(360.0).clamp(MIN_EXTENT_DEG, 360.0);
                self.set_span(end - width, width);
            }
            PolarHandle::End => {
                let start = self.start_azimuth();
                let width = (az_deg - start).rem_euclid(360.0).clamp(MIN_EXTENT_DEG, 360.0);
                self.set_span(start, width);
            }
            PolarHandle::Interior => {}
        }
    }

    fn set_span(&mut self, start: f64, width: f64) {
        self.half_width_deg = 0.5 * width;
        self.azimuth_deg = lon_delta(0.0, start + self.half_width_deg);
    }

    /// Rotates by `d_az` and shifts the distance band by `d_dist`, keeping
    /// the band within `[0, 180]`.
    pub fn translate(&mut self, d_dist: f64, d_az: f64) {
        self.azimuth_deg = lon_delta(0.0, self.azimuth_deg + d_az);
        let shift = d_dist.clamp(-self.inner_deg, 180.0 - self.outer_deg);
        self.inner_deg += shift;
        self.outer_deg += shift;
    }

    /// Visible stations and sources inside the wedge.
    pub fn members(&self, world: &MapWorld, projection: &Projection) -> Vec<ObjectRef> {
        let pole = projection.pole();
        let mut out = Vec::new();
        for (id, s) in world.stations().iter() {
            if s.is_visible() && self.contains(pole, s.spec.point) {
                out.push(ObjectRef::station(id));
            }
        }
        for (id, s) in world.sources().iter() {
            if s.is_visible() && self.contains(pole, s.spec.point) {
                out.push(ObjectRef::source(id));
            }
        }
        out
    }
}
