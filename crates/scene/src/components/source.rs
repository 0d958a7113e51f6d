use foundation::math::GeoPoint;
use serde::{Deserialize, Serialize};

use super::Labeled;
use super::style::{SymbolShape, SymbolStyle, TagPosition};

/// Uncertainty ellipse axes in kilometres; strike is the azimuth of the
/// major axis in degrees clockwise from north.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct EllipseAxes {
    pub smajax_km: f64,
    pub sminax_km: f64,
    pub strike_deg: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceSpec {
    pub point: GeoPoint,
    pub label: String,
    pub depth_km: f64,
    pub tag: TagPosition,
    pub symbol: SymbolStyle,
    /// When present the store keeps an owned ellipse for this source.
    pub ellipse: Option<EllipseAxes>,
}

impl SourceSpec {
    pub fn new(label: impl Into<String>, point: GeoPoint) -> Self {
        Self {
            point,
            label: label.into(),
            depth_km: 0.0,
            tag: TagPosition::Hidden,
            symbol: SymbolStyle {
                shape: SymbolShape::Diamond,
                ..SymbolStyle::default()
            },
            ellipse: None,
        }
    }

    pub fn with_ellipse(mut self, axes: EllipseAxes) -> Self {
        self.ellipse = Some(axes);
        self
    }
}

impl Labeled for SourceSpec {
    fn label(&self) -> &str {
        &self.label
    }
}
