use super::Vec3;

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// WGS84 first eccentricity squared.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);
/// WGS84 second eccentricity squared.
pub const WGS84_EP2: f64 = (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);

/// Mean spherical Earth radius (kilometres) used for small-circle and ellipse sizes.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Kilometres per degree of great-circle arc on the mean sphere.
pub const KM_PER_DEGREE: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

/// Geographic coordinates in degrees.
///
/// Longitude is periodic mod 360; latitude is kept within [-90, 90] by
/// [`GeoPoint::new`].
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: lat.clamp(-90.0, 90.0),
            lon,
        }
    }

    /// Same point with its longitude folded into [-180, 180).
    pub fn normalized(self) -> Self {
        Self {
            lat: self.lat,
            lon: normalize_lon(self.lon, 0.0),
        }
    }

    /// Unit vector on the sphere (x towards lon 0, z towards the north pole).
    pub fn to_unit_vector(self) -> Vec3 {
        let lat = self.lat.to_radians();
        let lon = self.lon.to_radians();
        Vec3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
    }

    pub fn from_unit_vector(v: Vec3) -> Self {
        let z = v.z.clamp(-1.0, 1.0);
        let lat = z.asin().to_degrees();
        let lon = if v.x == 0.0 && v.y == 0.0 {
            0.0
        } else {
            v.y.atan2(v.x).to_degrees()
        };
        Self { lat, lon }
    }

    /// Equality modulo the longitude period.
    pub fn approx_eq(self, other: Self, eps_deg: f64) -> bool {
        if (self.lat - other.lat).abs() > eps_deg {
            return false;
        }
        // Longitude is meaningless at the poles.
        if (self.lat.abs() - 90.0).abs() <= eps_deg {
            return true;
        }
        lon_delta(self.lon, other.lon).abs() <= eps_deg
    }
}

/// Fold `lon` into the half-open window `[center - 180, center + 180)`.
pub fn normalize_lon(lon: f64, center: f64) -> f64 {
    let lo = center - 180.0;
    let mut v = (lon - lo).rem_euclid(360.0) + lo;
    if v >= center + 180.0 {
        v -= 360.0;
    }
    v
}

/// Signed shortest longitude difference `b - a` in (-180, 180].
pub fn lon_delta(a: f64, b: f64) -> f64 {
    let d = (b - a).rem_euclid(360.0);
    if d > 180.0 { d - 360.0 } else { d }
}

#[cfg(test)]
mod tests {
    use super::{GeoPoint, lon_delta, normalize_lon};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn normalize_lon_into_window() {
        assert_close(normalize_lon(190.0, 0.0), -170.0, 1e-12);
        assert_close(normalize_lon(-180.0, 0.0), -180.0, 1e-12);
        assert_close(normalize_lon(180.0, 0.0), -180.0, 1e-12);
        assert_close(normalize_lon(10.0, 180.0), 10.0, 1e-12);
        assert_close(normalize_lon(-10.0, 180.0), 350.0, 1e-12);
    }

    #[test]
    fn lon_delta_takes_short_way() {
        assert_close(lon_delta(179.0, -179.0), 2.0, 1e-12);
        assert_close(lon_delta(-179.0, 179.0), -2.0, 1e-12);
        assert_close(lon_delta(0.0, 90.0), 90.0, 1e-12);
    }

    #[test]
    fn unit_vector_round_trip() {
        let p = GeoPoint::new(35.5, -120.25);
        let q = GeoPoint::from_unit_vector(p.to_unit_vector());
        assert!(p.approx_eq(q, 1e-10), "{p:?} vs {q:?}");
    }

    #[test]
    fn latitude_is_clamped() {
        assert_eq!(GeoPoint::new(95.0, 0.0).lat, 90.0);
        assert_eq!(GeoPoint::new(-91.0, 0.0).lat, -90.0);
    }
}
