//! Builds the derived polylines owned by arcs, deltas, ellipses and
//! rectangles.

use foundation::math::{
    EARTH_RADIUS_KM, GeoPoint, Vec3, destination, lon_delta, pole_frame,
};

use crate::components::{ArcKind, ArcSpec, DeltaSpec, EllipseAxes, EllipseSpec, RectangleSpec};
use crate::config::MaterializeConfig;
use crate::error::{StoreError, StoreResult};

fn buffer(n: usize, what: &'static str) -> StoreResult<Vec<GeoPoint>> {
    let mut out = Vec::new();
    out.try_reserve_exact(n)
        .map_err(|_| StoreError::ResourceExhausted { what })?;
    Ok(out)
}

fn check_finite(values: &[f64], what: &str) -> StoreResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(StoreError::MalformedGeometry(format!("non-finite {what}")))
    }
}

pub fn arc_path(spec: &ArcSpec, cfg: &MaterializeConfig) -> StoreResult<Vec<GeoPoint>> {
    check_finite(
        &[spec.origin.lat, spec.origin.lon, spec.distance_deg, spec.azimuth_deg],
        "arc parameters",
    )?;
    let n = cfg.arc_points.max(2);
    let mut out = buffer(n, "arc path")?;
    match spec.kind {
        ArcKind::Path => {
            let end = destination(spec.origin, spec.distance_deg, spec.azimuth_deg);
            let dlon = lon_delta(spec.origin.lon, end.lon);
            let dlat = end.lat - spec.origin.lat;
            for i in 0..n {
                let t = i as f64 / (n - 1) as f64;
                out.push(GeoPoint::new(
                    spec.origin.lat + dlat * t,
                    spec.origin.lon + dlon * t,
                ));
            }
        }
        ArcKind::General | ArcKind::Measurement | ArcKind::CursorMeasurement => {
            for i in 0..n {
                let d = spec.distance_deg * i as f64 / (n - 1) as f64;
                out.push(destination(spec.origin, d, spec.azimuth_deg));
            }
        }
    }
    Ok(out)
}

pub fn delta_ring(spec: &DeltaSpec, cfg: &MaterializeConfig) -> StoreResult<Vec<GeoPoint>> {
    check_finite(
        &[spec.origin.lat, spec.origin.lon, spec.radius_deg],
        "delta parameters",
    )?;
    if spec.radius_deg < 0.0 {
        return Err(StoreError::MalformedGeometry(format!(
            "negative delta radius {}",
            spec.radius_deg
        )));
    }
    let n = cfg.delta_points.max(4);
    let mut out = buffer(n, "delta ring")?;
    // Counter-clockwise seen from above: decreasing azimuth.
    for i in 0..n - 1 {
        let az = 360.0 - 360.0 * i as f64 / (n - 1) as f64;
        out.push(destination(spec.origin, spec.radius_deg, az));
    }
    out.push(out[0]);
    Ok(out)
}

/// Elliptical sweep in the tangent frame at the origin, rotated onto the
/// sphere with the origin's pole frame.
pub fn ellipse_ring(spec: &EllipseSpec, cfg: &MaterializeConfig) -> StoreResult<Vec<GeoPoint>> {
    let EllipseAxes {
        smajax_km,
        sminax_km,
        strike_deg,
    } = spec.axes;
    check_finite(
        &[spec.origin.lat, spec.origin.lon, smajax_km, sminax_km, strike_deg],
        "ellipse parameters",
    )?;
    if smajax_km < 0.0 || sminax_km < 0.0 {
        return Err(StoreError::MalformedGeometry(format!(
            "negative ellipse axis ({smajax_km}, {sminax_km})"
        )));
    }

    let n = cfg.ellipse_points.max(4);
    let mut out = buffer(n, "ellipse ring")?;
    let to_geo = pole_frame(spec.origin).transpose();
    let (sin_s, cos_s) = strike_deg.to_radians().sin_cos();
    let major = (sin_s, cos_s);
    let minor = (cos_s, -sin_s);

    for i in 0..n - 1 {
        let t = std::f64::consts::TAU * i as f64 / (n - 1) as f64;
        let a = smajax_km * t.cos();
        let b = sminax_km * t.sin();
        let east = a * major.0 + b * minor.0;
        let north = a * major.1 + b * minor.1;
        let dist_km = east.hypot(north);
        let local = if dist_km == 0.0 {
            Vec3::new(0.0, 0.0, 1.0)
        } else {
            let c = dist_km / EARTH_RADIUS_KM;
            let s = c.sin() / dist_km;
            Vec3::new(east * s, north * s, c.cos())
        };
        out.push(GeoPoint::from_unit_vector(to_geo.apply(local)));
    }
    out.push(out[0]);
    Ok(out)
}

pub fn rectangle_ring(spec: &RectangleSpec, cfg: &MaterializeConfig) -> StoreResult<Vec<GeoPoint>> {
    let (sw, ne) = (spec.south_west, spec.north_east);
    check_finite(&[sw.lat, sw.lon, ne.lat, ne.lon], "rectangle corners")?;
    if ne.lat <= sw.lat {
        return Err(StoreError::MalformedGeometry(format!(
            "rectangle north edge {} is not above south edge {}",
            ne.lat, sw.lat
        )));
    }
    let west = sw.lon;
    let mut east = west + (ne.lon - west).rem_euclid(360.0);
    if east == west {
        east += 360.0;
    }

    let k = cfg.rectangle_edge_points.max(2);
    let mut out = buffer(4 * (k - 1) + 1, "rectangle ring")?;
    let corners = [
        GeoPoint::new(sw.lat, west),
        GeoPoint::new(sw.lat, east),
        GeoPoint::new(ne.lat, east),
        GeoPoint::new(ne.lat, west),
    ];
    for (i, a) in corners.iter().enumerate() {
        let b = corners[(i + 1) % 4];
        for j in 0..k - 1 {
            let t = j as f64 / (k - 1) as f64;
            out.push(GeoPoint::new(
                a.lat + (b.lat - a.lat) * t,
                a.lon + (b.lon - a.lon) * t,
            ));
        }
    }
    out.push(out[0]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::math::{KM_PER_DEGREE, distance_azimuth};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn great_circle_arc_ends_at_destination() {
        let spec = ArcSpec::new(GeoPoint::new(0.0, 0.0), 90.0, 90.0);
        let path = arc_path(&spec, &MaterializeConfig::default()).unwrap();
        assert_eq!(path.len(), 100);
        let last = path[path.len() - 1];
        assert_close(last.lat, 0.0, 1e-9);
        assert_close(last.lon, 90.0, 1e-9);
        for p in &path {
            assert_close(p.lat, 0.0, 1e-9);
        }
    }

    #[test]
    fn path_arc_is_straight_in_lat_lon() {
        let spec = ArcSpec::new(GeoPoint::new(10.0, 170.0), 20.0, 90.0).with_kind(ArcKind::Path);
        let path = arc_path(&spec, &MaterializeConfig::default()).unwrap();
        let end = destination(spec.origin, 20.0, 90.0);
        let mid = path[path.len() / 2];
        assert!(mid.lon > 170.0, "path must run eastward across the dateline");
        assert_close(path[path.len() - 1].lat, end.lat, 1e-9);
    }

    #[test]
    fn delta_ring_is_closed_at_constant_distance() {
        let origin = GeoPoint::new(40.0, -100.0);
        let ring = delta_ring(&DeltaSpec::new(origin, 15.0), &MaterializeConfig::default()).unwrap();
        assert_eq!(ring.first(), ring.last());
        for p in &ring {
            assert_close(distance_azimuth(origin, *p).delta, 15.0, 1e-9);
        }
    }

    #[test]
    fn ellipse_axes_land_at_expected_distances() {
        let origin = GeoPoint::new(10.0, 20.0);
        let axes = EllipseAxes {
            smajax_km: 50.0,
            sminax_km: 20.0,
            strike_deg: 30.0,
        };
        let ring = ellipse_ring(&EllipseSpec::new(origin, axes), &MaterializeConfig::default())
            .unwrap();
        assert_eq!(ring.first(), ring.last());

        // t = 0 lies on the major axis along the strike.
        let da = distance_azimuth(origin, ring[0]);
        assert_close(da.delta * KM_PER_DEGREE, 50.0, 1e-6);
        assert_close(da.az, 30.0, 1e-6);

        // A quarter sweep lies on the minor axis, perpendicular to the strike.
        let q = distance_azimuth(origin, ring[(ring.len() - 1) / 4]);
        assert_close(q.delta * KM_PER_DEGREE, 20.0, 1e-6);
        assert_close(q.az, 120.0, 1e-6);
    }

    #[test]
    fn rectangle_ring_crosses_dateline_eastward() {
        let spec = RectangleSpec::new(
            GeoPoint::new(-10.0, 170.0),
            GeoPoint::new(10.0, -170.0),
            Default::default(),
        );
        let ring = rectangle_ring(&spec, &MaterializeConfig::default()).unwrap();
        let max_lon = ring.iter().map(|p| p.lon).fold(f64::MIN, f64::max);
        assert_close(max_lon, 190.0, 1e-12);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn bad_inputs_are_malformed() {
        let spec = DeltaSpec::new(GeoPoint::new(0.0, 0.0), -1.0);
        assert!(matches!(
            delta_ring(&spec, &MaterializeConfig::default()),
            Err(StoreError::MalformedGeometry(_))
        ));
        let spec = ArcSpec::new(GeoPoint::new(0.0, f64::NAN), 1.0, 0.0);
        assert!(arc_path(&spec, &MaterializeConfig::default()).is_err());
    }
}
