use foundation::math::{GeoPoint, distance_azimuth};
use serde::{Deserialize, Serialize};

use super::Labeled;
use super::style::LineStyle;
use crate::entity::ObjectRef;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArcKind {
    #[default]
    General,
    Measurement,
    CursorMeasurement,
    /// Straight in latitude/longitude rather than along a great circle.
    Path,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArcSpec {
    pub origin: GeoPoint,
    pub distance_deg: f64,
    pub azimuth_deg: f64,
    pub kind: ArcKind,
    pub label: String,
    pub style: LineStyle,
    /// Stations or sources this arc hangs off; deleting one deletes the arc.
    pub anchors: Vec<ObjectRef>,
}

impl ArcSpec {
    pub fn new(origin: GeoPoint, distance_deg: f64, azimuth_deg: f64) -> Self {
        Self {
            origin,
            distance_deg,
            azimuth_deg,
            kind: ArcKind::General,
            label: String::new(),
            style: LineStyle::default(),
            anchors: Vec::new(),
        }
    }

    /// Great-circle arc from `from` to `to`.
    pub fn between(from: GeoPoint, to: GeoPoint) -> Self {
        let da = distance_azimuth(from, to);
        Self::new(from, da.delta, da.az)
    }

    pub fn with_kind(mut self, kind: ArcKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn anchored_to(mut self, anchors: impl IntoIterator<Item = ObjectRef>) -> Self {
        self.anchors = anchors.into_iter().collect();
        self
    }
}

impl Labeled for ArcSpec {
    fn label(&self) -> &str {
        &self.label
    }
}
