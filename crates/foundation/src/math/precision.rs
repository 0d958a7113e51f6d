//! Float tolerances and ordering shared by the projection and fill code.

use core::cmp::Ordering;

/// Plane-space epsilon below which two ordinates are treated as equal.
pub const PLANE_EPSILON: f64 = 1.0e-12;

/// Maps `-0.0` to `0.0` and every NaN to one canonical NaN.
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Total order on floats in which both zeros compare equal.
///
/// Scanline crossings are keyed by x; a ring touching the axis from both
/// sides must not split into `-0.0` and `0.0` crossings.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

#[cfg(test)]
mod tests {
    use super::{canonical_f64, stable_total_cmp_f64};
    use core::cmp::Ordering;

    #[test]
    fn zeros_and_nans_are_canonical() {
        assert_eq!(canonical_f64(-0.0).to_bits(), 0.0f64.to_bits());
        assert!(canonical_f64(f64::NAN).is_nan());
        assert_eq!(canonical_f64(2.5), 2.5);
    }

    #[test]
    fn ordering_is_total() {
        assert_eq!(stable_total_cmp_f64(1.0, 2.0), Ordering::Less);
        assert_eq!(stable_total_cmp_f64(-0.0, 0.0), Ordering::Equal);
        assert_eq!(stable_total_cmp_f64(f64::NAN, f64::NAN), Ordering::Equal);
        assert_eq!(stable_total_cmp_f64(f64::INFINITY, f64::NAN), Ordering::Less);
    }
}
