use foundation::math::GeoPoint;

use super::Labeled;
use super::style::{SymbolStyle, TagPosition};

#[derive(Debug, Clone, PartialEq)]
pub struct StationSpec {
    pub point: GeoPoint,
    pub label: String,
    pub tag: TagPosition,
    pub symbol: SymbolStyle,
}

impl StationSpec {
    pub fn new(label: impl Into<String>, point: GeoPoint) -> Self {
        Self {
            point,
            label: label.into(),
            tag: TagPosition::default(),
            symbol: SymbolStyle::default(),
        }
    }
}

impl Labeled for StationSpec {
    fn label(&self) -> &str {
        &self.label
    }
}
