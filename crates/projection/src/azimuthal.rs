//! Radial laws of the pole-centred projections.
//!
//! Inputs are unit vectors already rotated into the pole frame (pole on +z,
//! east on +x, north on +y). Plane units are unit-sphere radians.

use foundation::math::Vec3;

/// Angular limit of the azimuthal equidistant projection (radians).
pub const EQUIDISTANT_LIMIT: f64 = 0.95 * std::f64::consts::PI;
/// Plane-radius limit of the azimuthal equal-area projection.
pub const EQUAL_AREA_LIMIT: f64 = 0.95 * 2.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RadialLaw {
    Orthographic,
    Equidistant,
    EqualArea,
}

impl RadialLaw {
    /// Radius of the visible disk in plane units.
    pub fn limit_radius(self) -> f64 {
        match self {
            RadialLaw::Orthographic => 1.0,
            RadialLaw::Equidistant => EQUIDISTANT_LIMIT,
            RadialLaw::EqualArea => EQUAL_AREA_LIMIT,
        }
    }

    /// Returns `(x, y, visible)`.
    pub fn forward(self, v: Vec3) -> (f64, f64, bool) {
        let s = (v.x * v.x + v.y * v.y).sqrt();
        match self {
            RadialLaw::Orthographic => (v.x, v.y, v.z >= 0.0),
            RadialLaw::Equidistant => {
                let c = s.atan2(v.z);
                if s < 1e-15 {
                    return if v.z > 0.0 {
                        (0.0, 0.0, true)
                    } else {
                        (std::f64::consts::PI, 0.0, false)
                    };
                }
                let k = c / s;
                (v.x * k, v.y * k, c <= EQUIDISTANT_LIMIT)
            }
            RadialLaw::EqualArea => {
                let denom = 1.0 + v.z;
                if denom < 1e-15 {
                    return (2.0, 0.0, false);
                }
                let k = (2.0 / denom).sqrt();
                let (x, y) = (v.x * k, v.y * k);
                (x, y, (x * x + y * y).sqrt() <= EQUAL_AREA_LIMIT)
            }
        }
    }

    /// Inverse law; `None` beyond the visible limit.
    pub fn inverse(self, x: f64, y: f64) -> Option<Vec3> {
        let r = (x * x + y * y).sqrt();
        if r > self.limit_radius() {
            return None;
        }
        if r < 1e-15 {
            return Some(Vec3::new(0.0, 0.0, 1.0));
        }
        let c = match self {
            RadialLaw::Orthographic => r.min(1.0).asin(),
            RadialLaw::Equidistant => r,
            RadialLaw::EqualArea => 2.0 * (0.5 * r).asin(),
        };
        let k = c.sin() / r;
        Some(Vec3::new(x * k, y * k, c.cos()))
    }
}

#[cfg(test)]
mod tests {
    use super::{EQUIDISTANT_LIMIT, RadialLaw};
    use foundation::math::Vec3;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn unit(c_deg: f64, az_deg: f64) -> Vec3 {
        let (c, az) = (c_deg.to_radians(), az_deg.to_radians());
        Vec3::new(c.sin() * az.sin(), c.sin() * az.cos(), c.cos())
    }

    #[test]
    fn equidistant_radius_is_angle() {
        let (x, y, visible) = RadialLaw::Equidistant.forward(unit(90.0, 90.0));
        assert!(visible);
        assert_close((x * x + y * y).sqrt(), std::f64::consts::FRAC_PI_2, 1e-12);
        let (_, _, far) = RadialLaw::Equidistant.forward(unit(175.0, 10.0));
        assert!(!far, "beyond {EQUIDISTANT_LIMIT}");
    }

    #[test]
    fn orthographic_hides_far_hemisphere() {
        assert!(RadialLaw::Orthographic.forward(unit(80.0, 0.0)).2);
        assert!(!RadialLaw::Orthographic.forward(unit(100.0, 0.0)).2);
    }

    #[test]
    fn laws_invert_inside_limit() {
        for law in [RadialLaw::Orthographic, RadialLaw::Equidistant, RadialLaw::EqualArea] {
            for (c, az) in [(0.0, 0.0), (10.0, 45.0), (60.0, 200.0), (85.0, 300.0)] {
                let v = unit(c, az);
                let (x, y, visible) = law.forward(v);
                assert!(visible);
                let back = law.inverse(x, y).expect("inside limit");
                assert!((back - v).length() < 1e-12, "{law:?} c={c} az={az}");
            }
        }
    }

    #[test]
    fn inverse_rejects_outside_disk() {
        assert!(RadialLaw::Orthographic.inverse(1.2, 0.0).is_none());
        assert!(RadialLaw::EqualArea.inverse(0.0, 1.95).is_none());
    }
}
