use foundation::bounds::Aabb2;
use foundation::math::{
    GeoPoint, Mat3, destination, distance_azimuth, normalize_lon, pole_frame,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::azimuthal::RadialLaw;
use crate::cylindrical::YLaw;
use crate::error::ProjectionError;
use crate::kind::ProjectionKind;
use crate::utm::{TransverseMercator, UtmCell};

/// Serializable projection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionParams {
    pub kind: ProjectionKind,
    /// Rotation pole as `[lon, lat]` in degrees.
    pub pole: [f64; 2],
    pub mercator_max_lat: f64,
    pub equal_area_max_lat: f64,
    /// Largest plotted distance (degrees) in the polar projection.
    pub polar_max_radius: f64,
    /// Active cell for `utm-near`, e.g. `"33T"`.
    pub utm_cell: Option<String>,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            kind: ProjectionKind::LinearCylindrical,
            pole: [0.0, 0.0],
            mercator_max_lat: 85.0,
            equal_area_max_lat: 90.0,
            polar_max_radius: 180.0,
            utm_cell: None,
        }
    }
}

/// Result of a forward projection.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    pub visible: bool,
}

impl Projected {
    pub fn new(x: f64, y: f64, visible: bool) -> Self {
        Self { x, y, visible }
    }
}

/// Projection state: kind, rotation pole and derived matrices, and the
/// active UTM cell.
///
/// `to_plane` and `to_geo` are always mutual inverses. Every change of kind,
/// pole or cell bumps `generation`, which callers use to invalidate cached
/// device-space geometry.
#[derive(Debug, Clone)]
pub struct Projection {
    kind: ProjectionKind,
    pole: GeoPoint,
    to_plane: Mat3,
    to_geo: Mat3,
    mercator_max_lat: f64,
    equal_area_max_lat: f64,
    polar_max_radius: f64,
    utm: Option<(UtmCell, TransverseMercator)>,
    generation: u64,
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(ProjectionKind::LinearCylindrical)
    }
}

impl Projection {
    pub fn new(kind: ProjectionKind) -> Self {
        let defaults = ProjectionParams::default();
        let pole = GeoPoint::new(0.0, 0.0);
        let to_plane = pole_frame(pole);
        let mut p = Self {
            kind,
            pole,
            to_plane,
            to_geo: to_plane.transpose(),
            mercator_max_lat: defaults.mercator_max_lat,
            equal_area_max_lat: defaults.equal_area_max_lat,
            polar_max_radius: defaults.polar_max_radius,
            utm: None,
            generation: 0,
        };
        if kind == ProjectionKind::UtmNear {
            p.ensure_utm_cell();
        }
        p
    }

    pub fn from_params(params: &ProjectionParams) -> Result<Self, ProjectionError> {
        let mut p = Self::new(params.kind);
        p.mercator_max_lat = params.mercator_max_lat.clamp(1.0, 89.999);
        p.equal_area_max_lat = params.equal_area_max_lat.clamp(1.0, 90.0);
        p.polar_max_radius = params.polar_max_radius.clamp(1.0, 180.0);
        if let Some(cell) = &params.utm_cell {
            p.set_utm_cell(cell.parse()?);
        }
        p.set_rotation(params.pole[0], params.pole[1]);
        Ok(p)
    }

    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: ProjectionKind) {
        if self.kind == kind {
            return;
        }
        debug!(from = %self.kind, to = %kind, "projection kind changed");
        self.kind = kind;
        if kind == ProjectionKind::UtmNear {
            self.ensure_utm_cell();
        }
        self.generation += 1;
    }

    pub fn pole(&self) -> GeoPoint {
        self.pole
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cylindrical(&self) -> bool {
        self.kind.is_cylindrical()
    }

    /// Centre of the periodic longitude window of cylindrical projections.
    pub fn lon_center(&self) -> f64 {
        self.pole.lon
    }

    pub fn utm_cell(&self) -> Option<UtmCell> {
        self.utm.map(|(cell, _)| cell)
    }

    pub fn set_utm_cell(&mut self, cell: UtmCell) {
        if self.utm_cell() == Some(cell) {
            return;
        }
        debug!(cell = %cell.label(), "utm cell selected");
        self.utm = Some((cell, TransverseMercator::for_cell(cell)));
        self.generation += 1;
    }

    fn ensure_utm_cell(&mut self) {
        if self.utm.is_none() {
            let cell = UtmCell::containing(self.pole)
                .or_else(|| UtmCell::new(31, 'N').ok());
            if let Some(cell) = cell {
                self.utm = Some((cell, TransverseMercator::for_cell(cell)));
            }
        }
    }

    /// Sets the rotation pole and rebuilds both rotation matrices.
    pub fn set_rotation(&mut self, pole_lon: f64, pole_lat: f64) {
        self.pole = GeoPoint::new(pole_lat, normalize_lon(pole_lon, 0.0));
        self.to_plane = pole_frame(self.pole);
        self.to_geo = self.to_plane.transpose();
        self.generation += 1;
    }

    /// `(geographic -> plane, plane -> geographic)`.
    pub fn rotation_matrices(&self) -> (Mat3, Mat3) {
        (self.to_plane, self.to_geo)
    }

    /// Re-centres the view on `target`.
    ///
    /// Pole-centred projections move their rotation pole; cylindrical ones
    /// only shift the longitude window and keep the pole latitude.
    pub fn recenter(&mut self, target: GeoPoint) {
        if self.kind.is_cylindrical() {
            self.set_rotation(target.lon, self.pole.lat);
        } else {
            self.set_rotation(target.lon, target.lat);
        }
        debug!(lon = target.lon, lat = target.lat, kind = %self.kind, "projection recentred");
    }

    pub fn y_law(&self) -> Option<YLaw> {
        match self.kind {
            ProjectionKind::LinearCylindrical | ProjectionKind::Utm => Some(YLaw::Linear),
            ProjectionKind::CylindricalEqualArea => Some(YLaw::EqualArea),
            ProjectionKind::Mercator => Some(YLaw::Mercator),
            _ => None,
        }
    }

    fn radial_law(&self) -> Option<RadialLaw> {
        match self.kind {
            ProjectionKind::Orthographic => Some(RadialLaw::Orthographic),
            ProjectionKind::AzimuthalEquidistant => Some(RadialLaw::Equidistant),
            ProjectionKind::AzimuthalEqualArea => Some(RadialLaw::EqualArea),
            _ => None,
        }
    }

    /// Clamp latitude of the cylindrical family.
    pub fn max_lat(&self) -> f64 {
        match self.kind {
            ProjectionKind::Mercator => self.mercator_max_lat,
            ProjectionKind::CylindricalEqualArea => self.equal_area_max_lat,
            _ => 90.0,
        }
    }

    /// Forward y-law of cylindrical projections (identity otherwise).
    pub fn forward_y(&self, lat: f64) -> f64 {
        match self.y_law() {
            Some(law) => law.forward(lat, self.max_lat()),
            None => lat,
        }
    }

    /// Radius of the visible disk for pole-centred and polar projections.
    pub fn limit_radius(&self) -> Option<f64> {
        match self.kind {
            ProjectionKind::Polar => Some(self.polar_max_radius),
            _ => self.radial_law().map(RadialLaw::limit_radius),
        }
    }

    /// Plane-space extent of the whole projected world.
    pub fn plane_extent(&self) -> Aabb2 {
        if self.kind.is_cylindrical() {
            let c = self.lon_center();
            let top = self.forward_y(self.max_lat());
            return Aabb2::new([c - 180.0, -top], [c + 180.0, top]);
        }
        if let Some(r) = self.limit_radius() {
            return Aabb2::new([-r, -r], [r, r]);
        }
        // utm-near: the cell with a one-cell margin.
        match self.utm {
            Some((cell, tm)) => {
                let (s, n) = cell.lat_band();
                let (w, e) = cell.lon_band();
                let corners = [
                    tm.forward(GeoPoint::new(s - 8.0, w - 6.0)),
                    tm.forward(GeoPoint::new(s - 8.0, e + 6.0)),
                    tm.forward(GeoPoint::new(n + 8.0, w - 6.0)),
                    tm.forward(GeoPoint::new(n + 8.0, e + 6.0)),
                    tm.forward(GeoPoint::new(0.5 * (s + n), w - 6.0)),
                    tm.forward(GeoPoint::new(0.5 * (s + n), e + 6.0)),
                ];
                Aabb2::from_points(
                    corners
                        .into_iter()
                        .map(|(x, y)| foundation::math::Vec2::new(x, y)),
                )
                .unwrap_or_else(|| Aabb2::new([0.0, 0.0], [1.0, 1.0]))
            }
            None => Aabb2::new([0.0, 0.0], [1.0, 1.0]),
        }
    }

    pub fn project(&self, p: GeoPoint) -> Projected {
        match self.kind {
            ProjectionKind::LinearCylindrical
            | ProjectionKind::Utm
            | ProjectionKind::CylindricalEqualArea
            | ProjectionKind::Mercator => {
                let x = normalize_lon(p.lon, self.lon_center());
                let max_lat = self.max_lat();
                let y = self.forward_y(p.lat);
                Projected::new(x, y, p.lat.abs() <= max_lat)
            }
            ProjectionKind::Orthographic
            | ProjectionKind::AzimuthalEquidistant
            | ProjectionKind::AzimuthalEqualArea => {
                let v = self.to_plane.apply(p.to_unit_vector());
                let law = self.radial_law().unwrap_or(RadialLaw::Orthographic);
                let (x, y, visible) = law.forward(v);
                Projected::new(x, y, visible)
            }
            ProjectionKind::Polar => {
                let d = distance_azimuth(self.pole, p);
                let az = d.az.to_radians();
                Projected::new(
                    d.delta * az.sin(),
                    d.delta * az.cos(),
                    d.delta <= self.polar_max_radius,
                )
            }
            ProjectionKind::UtmNear => match self.utm {
                Some((cell, tm)) => {
                    let (x, y) = tm.forward(p);
                    Projected::new(x, y, cell.within_extension(p))
                }
                None => Projected::new(0.0, 0.0, false),
            },
        }
    }

    /// Inverse mapping; `None` outside the projection's visible domain.
    pub fn unproject(&self, x: f64, y: f64) -> Option<GeoPoint> {
        match self.kind {
            ProjectionKind::LinearCylindrical
            | ProjectionKind::Utm
            | ProjectionKind::CylindricalEqualArea
            | ProjectionKind::Mercator => {
                let law = self.y_law()?;
                let top = law.forward(self.max_lat(), self.max_lat());
                if y.abs() > top + 1e-9 {
                    return None;
                }
                let lat = law.inverse(y);
                Some(GeoPoint::new(lat, normalize_lon(x, self.lon_center())))
            }
            ProjectionKind::Orthographic
            | ProjectionKind::AzimuthalEquidistant
            | ProjectionKind::AzimuthalEqualArea => {
                let v = self.radial_law()?.inverse(x, y)?;
                let g = GeoPoint::from_unit_vector(self.to_geo.apply(v));
                Some(g)
            }
            ProjectionKind::Polar => {
                let delta = (x * x + y * y).sqrt();
                if delta > self.polar_max_radius {
                    return None;
                }
                let az = x.atan2(y).to_degrees();
                let g = destination(self.pole, delta, az);
                Some(GeoPoint::new(g.lat, normalize_lon(g.lon, 0.0)))
            }
            ProjectionKind::UtmNear => {
                let (cell, tm) = self.utm?;
                let g = tm.inverse(x, y);
                cell.within_extension(g).then_some(g)
            }
        }
    }
}
