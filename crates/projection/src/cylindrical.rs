//! Latitude laws for the cylindrical family.
//!
//! Plane y is expressed in degree-equivalents so that the three laws share a
//! scale near the equator.

const DEG: f64 = 180.0 / std::f64::consts::PI;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum YLaw {
    Linear,
    EqualArea,
    Mercator,
}

impl YLaw {
    /// Forward law; `lat` is clamped to `max_lat` first.
    pub fn forward(self, lat: f64, max_lat: f64) -> f64 {
        let lat = lat.clamp(-max_lat, max_lat);
        match self {
            YLaw::Linear => lat,
            YLaw::EqualArea => lat.to_radians().sin() * DEG,
            YLaw::Mercator => {
                let phi = lat.to_radians();
                (std::f64::consts::FRAC_PI_4 + 0.5 * phi).tan().ln() * DEG
            }
        }
    }

    pub fn inverse(self, y: f64) -> f64 {
        match self {
            YLaw::Linear => y,
            YLaw::EqualArea => (y / DEG).clamp(-1.0, 1.0).asin().to_degrees(),
            YLaw::Mercator => {
                (2.0 * (y / DEG).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::YLaw;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn laws_invert() {
        for law in [YLaw::Linear, YLaw::EqualArea, YLaw::Mercator] {
            for lat in [-84.0, -45.5, -10.0, 0.0, 3.25, 60.0, 84.9] {
                assert_close(law.inverse(law.forward(lat, 85.0)), lat, 1e-9);
            }
        }
    }

    #[test]
    fn mercator_clamps_near_pole() {
        let top = YLaw::Mercator.forward(89.9, 85.0);
        assert_close(top, YLaw::Mercator.forward(85.0, 85.0), 1e-12);
        assert!(top.is_finite());
    }

    #[test]
    fn equal_area_matches_sine() {
        assert_close(YLaw::EqualArea.forward(30.0, 90.0), 0.5 * 180.0 / std::f64::consts::PI, 1e-12);
    }
}
