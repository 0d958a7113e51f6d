use foundation::ObjectId;
use foundation::math::GeoPoint;

use super::Labeled;
use super::source::EllipseAxes;
use super::style::LineStyle;

#[derive(Debug, Clone, PartialEq)]
pub struct EllipseSpec {
    pub origin: GeoPoint,
    pub axes: EllipseAxes,
    pub label: String,
    pub style: LineStyle,
    /// Owning source, if any. Set by the store.
    pub owner: Option<ObjectId>,
}

impl EllipseSpec {
    pub fn new(origin: GeoPoint, axes: EllipseAxes) -> Self {
        Self {
            origin,
            axes,
            label: String::new(),
            style: LineStyle::default(),
            owner: None,
        }
    }
}

impl Labeled for EllipseSpec {
    fn label(&self) -> &str {
        &self.label
    }
}
