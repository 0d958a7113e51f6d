use foundation::math::GeoPoint;

use super::Labeled;
use super::style::LineStyle;
use crate::entity::ObjectRef;

/// Small circle of constant angular distance around `origin`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaSpec {
    pub origin: GeoPoint,
    pub radius_deg: f64,
    pub label: String,
    pub style: LineStyle,
    pub anchors: Vec<ObjectRef>,
}

impl DeltaSpec {
    pub fn new(origin: GeoPoint, radius_deg: f64) -> Self {
        Self {
            origin,
            radius_deg,
            label: String::new(),
            style: LineStyle::default(),
            anchors: Vec::new(),
        }
    }

    pub fn anchored_to(mut self, anchors: impl IntoIterator<Item = ObjectRef>) -> Self {
        self.anchors = anchors.into_iter().collect();
        self
    }
}

impl Labeled for DeltaSpec {
    fn label(&self) -> &str {
        &self.label
    }
}
