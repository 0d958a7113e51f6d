use std::fmt;

use foundation::ObjectId;
use serde::{Deserialize, Serialize};

/// Category of a stored object. Ids are unique across all categories.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    Station,
    Source,
    Arc,
    Delta,
    Ellipse,
    Line,
    Polygon,
    Rectangle,
    SymbolGroup,
    Circle,
    Theme,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 11] = [
        ObjectKind::Station,
        ObjectKind::Source,
        ObjectKind::Arc,
        ObjectKind::Delta,
        ObjectKind::Ellipse,
        ObjectKind::Line,
        ObjectKind::Polygon,
        ObjectKind::Rectangle,
        ObjectKind::SymbolGroup,
        ObjectKind::Circle,
        ObjectKind::Theme,
    ];

    /// Kinds removed by a bulk overlay clear.
    pub const OVERLAYS: [ObjectKind; 7] = [
        ObjectKind::Arc,
        ObjectKind::Delta,
        ObjectKind::Line,
        ObjectKind::Polygon,
        ObjectKind::Rectangle,
        ObjectKind::SymbolGroup,
        ObjectKind::Circle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Station => "station",
            ObjectKind::Source => "source",
            ObjectKind::Arc => "arc",
            ObjectKind::Delta => "delta",
            ObjectKind::Ellipse => "ellipse",
            ObjectKind::Line => "line",
            ObjectKind::Polygon => "polygon",
            ObjectKind::Rectangle => "rectangle",
            ObjectKind::SymbolGroup => "symbol-group",
            ObjectKind::Circle => "circle",
            ObjectKind::Theme => "theme",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed reference to a stored object.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    pub kind: ObjectKind,
    pub id: ObjectId,
}

impl ObjectRef {
    pub fn new(kind: ObjectKind, id: ObjectId) -> Self {
        Self { kind, id }
    }

    pub fn station(id: ObjectId) -> Self {
        Self::new(ObjectKind::Station, id)
    }

    pub fn source(id: ObjectId) -> Self {
        Self::new(ObjectKind::Source, id)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}
