//! UTM cells and the ellipsoidal transverse Mercator series (WGS84).

use foundation::math::{GeoPoint, WGS84_A, WGS84_E2, WGS84_EP2, lon_delta};

use crate::error::ProjectionError;

/// Latitude band letters from 80S northwards, 8 degrees each (X spans 12).
const BAND_LETTERS: &[u8] = b"CDEFGHJKLMNPQRSTUVWX";
const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Extension tolerance around the cell centre inside which UTM-near
/// projection still reports points as visible.
pub const EXTENSION_LON_DEG: f64 = 90.0;
pub const EXTENSION_LAT_DEG: f64 = 50.0;

/// A 6 degree x 8 degree UTM grid cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UtmCell {
    zone: u8,
    letter: char,
}

impl UtmCell {
    pub fn new(zone: u8, letter: char) -> Result<Self, ProjectionError> {
        if !(1..=60).contains(&zone) {
            return Err(ProjectionError::InvalidCell(format!("zone {zone} not in 1..=60")));
        }
        let letter = letter.to_ascii_uppercase();
        if !BAND_LETTERS.contains(&(letter as u8)) {
            return Err(ProjectionError::InvalidCell(format!("band letter {letter:?}")));
        }
        Ok(Self { zone, letter })
    }

    /// Cell containing `p`; `None` outside the 80S..84N UTM latitude range.
    pub fn containing(p: GeoPoint) -> Option<Self> {
        if !(-80.0..=84.0).contains(&p.lat) {
            return None;
        }
        let lon = foundation::math::normalize_lon(p.lon, 0.0);
        let zone = (((lon + 180.0) / 6.0).floor() as i32).clamp(0, 59) as u8 + 1;
        let band = (((p.lat + 80.0) / 8.0).floor() as usize).min(BAND_LETTERS.len() - 1);
        Some(Self {
            zone,
            letter: BAND_LETTERS[band] as char,
        })
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    pub fn letter(&self) -> char {
        self.letter
    }

    pub fn central_meridian(&self) -> f64 {
        f64::from(self.zone) * 6.0 - 183.0
    }

    fn band_index(&self) -> usize {
        BAND_LETTERS
            .iter()
            .position(|b| *b as char == self.letter)
            .unwrap_or(0)
    }

    /// `(south, north)` latitude limits of the band.
    pub fn lat_band(&self) -> (f64, f64) {
        let south = -80.0 + 8.0 * self.band_index() as f64;
        let north = if self.letter == 'X' { 84.0 } else { south + 8.0 };
        (south, north)
    }

    /// `(west, east)` longitude limits of the zone.
    pub fn lon_band(&self) -> (f64, f64) {
        let cm = self.central_meridian();
        (cm - 3.0, cm + 3.0)
    }

    pub fn center(&self) -> GeoPoint {
        let (s, n) = self.lat_band();
        GeoPoint::new(0.5 * (s + n), self.central_meridian())
    }

    pub fn is_southern(&self) -> bool {
        self.letter < 'N'
    }

    /// Whether `p` lies within the extension tolerance of the cell centre.
    pub fn within_extension(&self, p: GeoPoint) -> bool {
        let c = self.center();
        lon_delta(c.lon, p.lon).abs() <= EXTENSION_LON_DEG
            && (p.lat - c.lat).abs() <= EXTENSION_LAT_DEG
    }

    pub fn label(&self) -> String {
        format!("{}{}", self.zone, self.letter)
    }
}

impl std::str::FromStr for UtmCell {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(letter) = s.chars().last() else {
            return Err(ProjectionError::InvalidCell("empty".to_string()));
        };
        let zone: u8 = s[..s.len() - letter.len_utf8()]
            .parse()
            .map_err(|_| ProjectionError::InvalidCell(s.to_string()))?;
        UtmCell::new(zone, letter)
    }
}

/// Transverse Mercator series constants for one central meridian.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransverseMercator {
    lon0: f64,
    false_northing: f64,
    // Meridional-arc coefficients.
    m1: f64,
    m2: f64,
    m3: f64,
    m4: f64,
    // Footpoint-latitude coefficients.
    e1: f64,
}

impl TransverseMercator {
    pub fn for_cell(cell: UtmCell) -> Self {
        let e2 = WGS84_E2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let sq = (1.0 - e2).sqrt();
        Self {
            lon0: cell.central_meridian(),
            false_northing: if cell.is_southern() {
                FALSE_NORTHING_SOUTH
            } else {
                0.0
            },
            m1: 1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0,
            m2: 3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0,
            m3: 15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0,
            m4: 35.0 * e6 / 3072.0,
            e1: (1.0 - sq) / (1.0 + sq),
        }
    }

    fn meridional_arc(&self, phi: f64) -> f64 {
        WGS84_A
            * (self.m1 * phi - self.m2 * (2.0 * phi).sin() + self.m3 * (4.0 * phi).sin()
                - self.m4 * (6.0 * phi).sin())
    }

    /// `(easting, northing)` in metres.
    pub fn forward(&self, p: GeoPoint) -> (f64, f64) {
        let ep2 = WGS84_EP2;
        let phi = p.lat.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();

        let n = WGS84_A / (1.0 - WGS84_E2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let a = cos_phi * lon_delta(self.lon0, p.lon).to_radians();
        let m = self.meridional_arc(phi);

        let a2 = a * a;
        let a3 = a2 * a;
        let a4 = a3 * a;
        let a5 = a4 * a;
        let a6 = a5 * a;

        let x = K0
            * n
            * (a + (1.0 - t + c) * a3 / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a5 / 120.0);
        let y = K0
            * (m + n
                * tan_phi
                * (a2 / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a6 / 720.0));

        (x + FALSE_EASTING, y + self.false_northing)
    }

    pub fn inverse(&self, easting: f64, northing: f64) -> GeoPoint {
        let e2 = WGS84_E2;
        let ep2 = WGS84_EP2;
        let e1 = self.e1;
        let x = easting - FALSE_EASTING;
        let y = northing - self.false_northing;

        let m = y / K0;
        let mu = m / (WGS84_A * self.m1);
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin1, cos1) = phi1.sin_cos();
        let tan1 = phi1.tan();
        let c1 = ep2 * cos1 * cos1;
        let t1 = tan1 * tan1;
        let w = 1.0 - e2 * sin1 * sin1;
        let n1 = WGS84_A / w.sqrt();
        let r1 = WGS84_A * (1.0 - e2) / w.powf(1.5);
        let d = x / (n1 * K0);
        let d2 = d * d;
        let d3 = d2 * d;
        let d4 = d3 * d;
        let d5 = d4 * d;
        let d6 = d5 * d;

        let phi = phi1
            - (n1 * tan1 / r1)
                * (d2 / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d4 / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * ep2
                        - 3.0 * c1 * c1)
                        * d6
                        / 720.0);
        let lam = (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d5
                / 120.0)
            / cos1;

        GeoPoint {
            lat: phi.to_degrees(),
            lon: self.lon0 + lam.to_degrees(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TransverseMercator, UtmCell};
    use foundation::math::GeoPoint;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn cell_lookup() {
        let cell = UtmCell::containing(GeoPoint::new(48.85, 2.35)).expect("paris");
        assert_eq!(cell.label(), "31U");
        assert_eq!(cell.central_meridian(), 3.0);
        assert_eq!(cell.lat_band(), (48.0, 56.0));
        let south = UtmCell::containing(GeoPoint::new(-33.9, 151.2)).expect("sydney");
        assert_eq!(south.label(), "56H");
        assert!(south.is_southern());
        assert!(UtmCell::containing(GeoPoint::new(85.0, 0.0)).is_none());
        assert_eq!(UtmCell::containing(GeoPoint::new(80.0, 0.0)).map(|c| c.letter()), Some('X'));
    }

    #[test]
    fn cell_parse_and_validation() {
        assert_eq!("33T".parse::<UtmCell>(), UtmCell::new(33, 'T'));
        assert!("61N".parse::<UtmCell>().is_err());
        assert!("10I".parse::<UtmCell>().is_err());
        assert!("".parse::<UtmCell>().is_err());
    }

    #[test]
    fn central_meridian_maps_to_false_easting() {
        let cell = UtmCell::new(31, 'N').expect("cell");
        let tm = TransverseMercator::for_cell(cell);
        let (e, n) = tm.forward(GeoPoint::new(0.0, 3.0));
        assert_close(e, 500_000.0, 1e-6);
        assert_close(n, 0.0, 1e-6);
    }

    #[test]
    fn matches_reference_values() {
        let tm = TransverseMercator::for_cell(UtmCell::new(31, 'T').expect("cell"));
        // On the central meridian northing is k0 times the meridional arc.
        let (e, n) = tm.forward(GeoPoint::new(45.0, 3.0));
        assert_close(e, 500_000.0, 1e-6);
        assert_close(n, 4_982_950.400, 0.01);
        // Equator at the zone edge.
        let (e, n) = tm.forward(GeoPoint::new(0.0, 6.0));
        assert_close(e, 833_978.557, 0.01);
        assert_close(n, 0.0, 1e-6);
    }

    #[test]
    fn series_round_trip_inside_zone() {
        for cell in ["31U", "56H", "10S", "1C"] {
            let cell: UtmCell = cell.parse().expect("cell");
            let tm = TransverseMercator::for_cell(cell);
            let c = cell.center();
            for dlat in [-4.0, 0.0, 3.5] {
                for dlon in [-3.0, -0.5, 0.0, 2.0, 3.0] {
                    let p = GeoPoint::new(c.lat + dlat, c.lon + dlon);
                    let (e, n) = tm.forward(p);
                    let back = tm.inverse(e, n);
                    assert!(back.approx_eq(p, 1e-6), "{cell:?}: {p:?} -> {back:?}");
                }
            }
        }
    }
}
