use std::collections::BTreeSet;

use foundation::math::{GeoPoint, normalize_lon};
use serde::{Deserialize, Serialize};

use super::Labeled;
use super::style::{Color, ColorScale, SymbolStyle};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    Polygon,
    Point,
    Polyline,
}

/// One record of a shape theme. Polygon parts are rings (outer rings
/// counter-clockwise, holes clockwise); polyline parts are open paths;
/// point shapes use the first vertex of each part.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub parts: Vec<Vec<GeoPoint>>,
    pub value: Option<f64>,
    pub label: Option<String>,
}

impl Shape {
    pub fn polygon(parts: Vec<Vec<GeoPoint>>) -> Self {
        Self {
            kind: ShapeKind::Polygon,
            parts,
            value: None,
            label: None,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeTheme {
    /// Declared kind. Shapes of another kind are not filled.
    pub kind: ShapeKind,
    pub shapes: Vec<Shape>,
    pub fill: Option<Color>,
    pub boundary: Option<Color>,
    /// When set, each shape's `value` picks its fill color.
    pub color_scale: Option<ColorScale>,
    pub symbol: SymbolStyle,
    /// Indices into `shapes` currently selected.
    pub selected: BTreeSet<usize>,
}

impl ShapeTheme {
    pub fn new(kind: ShapeKind, shapes: Vec<Shape>) -> Self {
        Self {
            kind,
            shapes,
            fill: None,
            boundary: Some(super::style::colors::BLACK),
            color_scale: None,
            symbol: SymbolStyle::default(),
            selected: BTreeSet::new(),
        }
    }

    pub fn fill_for(&self, shape: &Shape) -> Option<Color> {
        match (&self.color_scale, shape.value) {
            (Some(scale), Some(v)) => Some(scale.color_for(v)),
            _ => self.fill,
        }
    }
}

/// Regular latitude/longitude grid of scalar samples.
///
/// `values` is row-major with one row per latitude; both axes ascend.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarGrid {
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    pub values: Vec<f64>,
    /// Samples equal to this value (or NaN) are treated as missing.
    pub no_data: Option<f64>,
}

impl ScalarGrid {
    pub fn validate(&self) -> Result<(), String> {
        if self.lats.len() < 2 || self.lons.len() < 2 {
            return Err("grid needs at least two rows and two columns".into());
        }
        if self.values.len() != self.lats.len() * self.lons.len() {
            return Err(format!(
                "grid has {} values, expected {}x{}",
                self.values.len(),
                self.lats.len(),
                self.lons.len()
            ));
        }
        let ascending = |v: &[f64]| v.windows(2).all(|w| w[0] < w[1]);
        if !ascending(&self.lats) || !ascending(&self.lons) {
            return Err("grid axes must be strictly ascending".into());
        }
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.lats.len()
    }

    pub fn cols(&self) -> usize {
        self.lons.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        let v = *self.values.get(row * self.lons.len() + col)?;
        if v.is_nan() || self.no_data == Some(v) {
            None
        } else {
            Some(v)
        }
    }

    /// Nearest grid cell to `p`, if `p` falls inside the grid's extent.
    pub fn nearest(&self, p: GeoPoint) -> Option<(usize, usize)> {
        let (lat0, lat1) = (*self.lats.first()?, *self.lats.last()?);
        let (lon0, lon1) = (*self.lons.first()?, *self.lons.last()?);
        if p.lat < lat0 || p.lat > lat1 {
            return None;
        }
        let lon = normalize_lon(p.lon, lon0 + 180.0);
        if lon > lon1 {
            return None;
        }
        Some((nearest_index(&self.lats, p.lat), nearest_index(&self.lons, lon)))
    }

    pub fn value_at(&self, p: GeoPoint) -> Option<f64> {
        let (row, col) = self.nearest(p)?;
        self.get(row, col)
    }
}

fn nearest_index(axis: &[f64], v: f64) -> usize {
    let i = axis.partition_point(|&a| a < v);
    if i == 0 {
        return 0;
    }
    if i >= axis.len() {
        return axis.len() - 1;
    }
    if (v - axis[i - 1]) <= (axis[i] - v) { i - 1 } else { i }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageTheme {
    pub grid: ScalarGrid,
    pub color_scale: ColorScale,
    /// Fill each pixel from the color scale.
    pub shade: bool,
    /// Contour levels to trace; empty disables contouring.
    pub contour_levels: Vec<f64>,
    pub contour_color: Color,
}

impl ImageTheme {
    pub fn new(grid: ScalarGrid, color_scale: ColorScale) -> Self {
        Self {
            grid,
            color_scale,
            shade: true,
            contour_levels: Vec::new(),
            contour_color: super::style::colors::BLACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThemeVariant {
    Shape(ShapeTheme),
    Image(ImageTheme),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeSpec {
    pub name: String,
    pub variant: ThemeVariant,
    /// Theme is drawn only while the visible plane width (in degrees for
    /// cylindrical views) lies within `[on, off)`.
    pub on_off_distance: Option<(f64, f64)>,
}

impl ThemeSpec {
    pub fn shapes(name: impl Into<String>, theme: ShapeTheme) -> Self {
        Self {
            name: name.into(),
            variant: ThemeVariant::Shape(theme),
            on_off_distance: None,
        }
    }

    pub fn image(name: impl Into<String>, theme: ImageTheme) -> Self {
        Self {
            name: name.into(),
            variant: ThemeVariant::Image(theme),
            on_off_distance: None,
        }
    }

    pub fn shown_at(&self, visible_width: f64) -> bool {
        match self.on_off_distance {
            Some((on, off)) => visible_width >= on && visible_width < off,
            None => true,
        }
    }
}

impl Labeled for ThemeSpec {
    fn label(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> ScalarGrid {
        ScalarGrid {
            lats: vec![0.0, 10.0, 20.0],
            lons: vec![100.0, 110.0],
            values: vec![1.0, 2.0, 3.0, -999.0, 5.0, 6.0],
            no_data: Some(-999.0),
        }
    }

    #[test]
    fn grid_lookup_snaps_to_nearest_sample() {
        let g = grid();
        assert!(g.validate().is_ok());
        assert_eq!(g.value_at(GeoPoint::new(1.0, 101.0)), Some(1.0));
        assert_eq!(g.value_at(GeoPoint::new(19.0, 109.0)), Some(6.0));
        assert_eq!(g.value_at(GeoPoint::new(9.0, 108.0)), None);
        assert_eq!(g.value_at(GeoPoint::new(30.0, 105.0)), None);
    }

    #[test]
    fn grid_lookup_wraps_longitude() {
        let g = grid();
        assert_eq!(g.value_at(GeoPoint::new(0.0, 100.0 - 360.0)), Some(1.0));
    }

    #[test]
    fn grid_shape_is_validated() {
        let mut g = grid();
        g.values.pop();
        assert!(g.validate().is_err());
    }

    #[test]
    fn on_off_window() {
        let mut spec = ThemeSpec::shapes("coast", ShapeTheme::new(ShapeKind::Polygon, vec![]));
        spec.on_off_distance = Some((0.0, 90.0));
        assert!(spec.shown_at(45.0));
        assert!(!spec.shown_at(90.0));
    }
}
