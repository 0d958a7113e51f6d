use foundation::math::GeoPoint;

use super::Labeled;
use super::style::{FillStyle, LineStyle, SymbolStyle};

/// Open polyline through raw vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSpec {
    pub points: Vec<GeoPoint>,
    pub label: String,
    pub style: LineStyle,
}

impl LineSpec {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self {
            points,
            label: String::new(),
            style: LineStyle::default(),
        }
    }
}

/// Closed ring; the closing edge is implied.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonSpec {
    pub ring: Vec<GeoPoint>,
    pub label: String,
    pub fill: FillStyle,
}

impl PolygonSpec {
    pub fn new(ring: Vec<GeoPoint>, fill: FillStyle) -> Self {
        Self {
            ring,
            label: String::new(),
            fill,
        }
    }
}

/// Latitude/longitude aligned box between two corners. Longitudes run
/// eastward from `south_west` to `north_east`.
#[derive(Debug, Clone, PartialEq)]
pub struct RectangleSpec {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
    pub label: String,
    pub fill: FillStyle,
}

impl RectangleSpec {
    pub fn new(south_west: GeoPoint, north_east: GeoPoint, fill: FillStyle) -> Self {
        Self {
            south_west,
            north_east,
            label: String::new(),
            fill,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub point: GeoPoint,
    pub style: SymbolStyle,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolGroupSpec {
    pub symbols: Vec<Symbol>,
    pub label: String,
}

impl SymbolGroupSpec {
    pub fn new(label: impl Into<String>, symbols: Vec<Symbol>) -> Self {
        Self {
            symbols,
            label: label.into(),
        }
    }
}

/// Screen-relative marker: the radius is in pixels, not on the sphere.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CircleMarker {
    pub center: GeoPoint,
    pub radius_px: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleSpec {
    pub circles: Vec<CircleMarker>,
    pub label: String,
    pub style: LineStyle,
}

impl CircleSpec {
    pub fn new(circles: Vec<CircleMarker>) -> Self {
        Self {
            circles,
            label: String::new(),
            style: LineStyle::default(),
        }
    }
}

impl Labeled for LineSpec {
    fn label(&self) -> &str {
        &self.label
    }
}

impl Labeled for PolygonSpec {
    fn label(&self) -> &str {
        &self.label
    }
}

impl Labeled for RectangleSpec {
    fn label(&self) -> &str {
        &self.label
    }
}

impl Labeled for SymbolGroupSpec {
    fn label(&self) -> &str {
        &self.label
    }
}

impl Labeled for CircleSpec {
    fn label(&self) -> &str {
        &self.label
    }
}
