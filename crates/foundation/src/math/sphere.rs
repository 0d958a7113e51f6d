//! Spherical trigonometry on the unit sphere (angles in degrees).

use super::GeoPoint;

/// Great-circle distance and azimuths between two points.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DistAz {
    /// Angular distance in degrees, in [0, 180].
    pub delta: f64,
    /// Azimuth from the first point towards the second, clockwise from north, in [0, 360).
    pub az: f64,
    /// Back azimuth from the second point towards the first, in [0, 360).
    pub baz: f64,
}

pub fn distance_azimuth(from: GeoPoint, to: GeoPoint) -> DistAz {
    let (delta, az) = delta_az(from, to);
    let (_, baz) = delta_az(to, from);
    DistAz { delta, az, baz }
}

fn delta_az(from: GeoPoint, to: GeoPoint) -> (f64, f64) {
    let (s1, c1) = from.lat.to_radians().sin_cos();
    let (s2, c2) = to.lat.to_radians().sin_cos();
    let (sdl, cdl) = (to.lon - from.lon).to_radians().sin_cos();

    let y = c2 * sdl;
    let x = c1 * s2 - s1 * c2 * cdl;
    let cos_delta = s1 * s2 + c1 * c2 * cdl;
    let delta = (y * y + x * x).sqrt().atan2(cos_delta).to_degrees();
    let az = if y == 0.0 && x == 0.0 {
        0.0
    } else {
        let az = y.atan2(x).to_degrees().rem_euclid(360.0);
        if az >= 360.0 { 0.0 } else { az }
    };
    (delta, az)
}

/// Point reached by travelling `delta_deg` along the great circle leaving
/// `origin` at azimuth `az_deg`.
pub fn destination(origin: GeoPoint, delta_deg: f64, az_deg: f64) -> GeoPoint {
    let (s1, c1) = origin.lat.to_radians().sin_cos();
    let (sd, cd) = delta_deg.to_radians().sin_cos();
    let (sa, ca) = az_deg.to_radians().sin_cos();

    let s2 = (s1 * cd + c1 * sd * ca).clamp(-1.0, 1.0);
    let lat2 = s2.asin();
    let dlon = (sa * sd * c1).atan2(cd - s1 * s2);
    GeoPoint {
        lat: lat2.to_degrees(),
        lon: origin.lon + dlon.to_degrees(),
    }
}

#[cfg(test)]
mod tests {
    use super::{destination, distance_azimuth};
    use crate::math::GeoPoint;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn quarter_circle_along_equator() {
        let d = distance_azimuth(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 90.0));
        assert_close(d.delta, 90.0, 1e-12);
        assert_close(d.az, 90.0, 1e-12);
        assert_close(d.baz, 270.0, 1e-12);
    }

    #[test]
    fn due_north_along_meridian() {
        let d = distance_azimuth(GeoPoint::new(10.0, 20.0), GeoPoint::new(50.0, 20.0));
        assert_close(d.delta, 40.0, 1e-10);
        assert_close(d.az, 0.0, 1e-10);
        assert_close(d.baz, 180.0, 1e-10);
    }

    #[test]
    fn destination_inverts_distance_azimuth() {
        let a = GeoPoint::new(-33.9, 18.4);
        let b = GeoPoint::new(51.5, -0.1);
        let d = distance_azimuth(a, b);
        let c = destination(a, d.delta, d.az);
        assert!(c.approx_eq(b, 1e-9), "{c:?} vs {b:?}");
    }

    #[test]
    fn destination_crosses_dateline() {
        let p = destination(GeoPoint::new(0.0, 170.0), 20.0, 90.0);
        assert_close(p.lat, 0.0, 1e-12);
        assert_close(p.lon, 190.0, 1e-10);
    }
}
