use super::{GeoPoint, Vec3};

/// Row-major 3x3 matrix.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat3 {
    pub m: [[f64; 3]; 3],
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat3 {
    pub const fn new(m: [[f64; 3]; 3]) -> Self {
        Self { m }
    }

    pub const fn identity() -> Self {
        Self::new([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    pub fn rot_x(angle_rad: f64) -> Self {
        let (s, c) = angle_rad.sin_cos();
        Self::new([[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]])
    }

    pub fn rot_y(angle_rad: f64) -> Self {
        let (s, c) = angle_rad.sin_cos();
        Self::new([[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]])
    }

    pub fn rot_z(angle_rad: f64) -> Self {
        let (s, c) = angle_rad.sin_cos();
        Self::new([[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]])
    }

    pub fn transpose(&self) -> Self {
        let m = &self.m;
        Self::new([
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        ])
    }

    pub fn mul(&self, other: &Self) -> Self {
        let mut out = [[0.0; 3]; 3];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.m[r][k] * other.m[k][c]).sum();
            }
        }
        Self::new(out)
    }

    pub fn apply(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    /// Largest absolute element-wise difference.
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        let mut worst = 0.0f64;
        for r in 0..3 {
            for c in 0..3 {
                worst = worst.max((self.m[r][c] - other.m[r][c]).abs());
            }
        }
        worst
    }
}

/// Euler composition `Rz(gamma) * Ry(beta) * Rz(alpha)`.
pub fn euler_zyz(alpha_rad: f64, beta_rad: f64, gamma_rad: f64) -> Mat3 {
    Mat3::rot_z(gamma_rad)
        .mul(&Mat3::rot_y(beta_rad))
        .mul(&Mat3::rot_z(alpha_rad))
}

/// Rotation taking geographic unit vectors into the frame centred on `pole`.
///
/// In the rotated frame the pole lies on +z, local east on +x and local
/// north on +y. The transpose maps back to geographic.
pub fn pole_frame(pole: GeoPoint) -> Mat3 {
    euler_zyz(
        -pole.lon.to_radians(),
        (pole.lat - 90.0).to_radians(),
        -std::f64::consts::FRAC_PI_2,
    )
}

#[cfg(test)]
mod tests {
    use super::{Mat3, pole_frame};
    use crate::math::{GeoPoint, Vec3};

    fn assert_vec_close(a: Vec3, b: Vec3, eps: f64) {
        let d = (a - b).length();
        assert!(d <= eps, "expected {a:?} ~= {b:?} (diff {d})");
    }

    #[test]
    fn pole_maps_to_z_axis() {
        for (lat, lon) in [(0.0, 0.0), (45.0, 30.0), (-60.0, -150.0), (89.0, 179.0)] {
            let pole = GeoPoint::new(lat, lon);
            let r = pole_frame(pole);
            assert_vec_close(r.apply(pole.to_unit_vector()), Vec3::new(0.0, 0.0, 1.0), 1e-12);
        }
    }

    #[test]
    fn frame_orients_east_and_north() {
        let pole = GeoPoint::new(30.0, 40.0);
        let r = pole_frame(pole);
        let (lat, lon) = (pole.lat.to_radians(), pole.lon.to_radians());
        let east = Vec3::new(-lon.sin(), lon.cos(), 0.0);
        let north = Vec3::new(-lat.sin() * lon.cos(), -lat.sin() * lon.sin(), lat.cos());
        assert_vec_close(r.apply(east), Vec3::new(1.0, 0.0, 0.0), 1e-12);
        assert_vec_close(r.apply(north), Vec3::new(0.0, 1.0, 0.0), 1e-12);
    }

    #[test]
    fn transpose_is_inverse() {
        let r = pole_frame(GeoPoint::new(-12.0, 77.0));
        let product = r.mul(&r.transpose());
        assert!(product.max_abs_diff(&Mat3::identity()) < 1e-12);
    }
}
