//! Host notifications pushed through the plot's event bus.

use foundation::ObjectId;
use foundation::math::GeoPoint;
use projection::UtmCell;
use scene::ObjectRef;

use crate::polar::PolarSelection;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectionTarget {
    Object(ObjectRef),
    ThemeShape { theme: ObjectId, index: usize },
    Symbol { group: ObjectId, index: usize },
}

/// What lies under the cursor.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CursorInfo {
    pub x: f64,
    pub y: f64,
    /// `None` off the projected world.
    pub point: Option<GeoPoint>,
    pub utm_cell: Option<UtmCell>,
    /// Value of the top-most visible image theme.
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    SelectionChanged {
        target: SelectionTarget,
        selected: bool,
    },
    DragMoved {
        target: ObjectRef,
        point: GeoPoint,
    },
    DragCommitted {
        target: ObjectRef,
        from: GeoPoint,
        to: GeoPoint,
    },
    MeasurementCreated {
        arc: ObjectId,
        delta: ObjectId,
        origin: GeoPoint,
    },
    MeasurementUpdated {
        arc: ObjectId,
        delta: ObjectId,
        distance_deg: f64,
        azimuth_deg: f64,
    },
    MeasurementDeleted {
        arc: ObjectId,
        delta: ObjectId,
    },
    CursorMotion(CursorInfo),
    UtmCellEntered(UtmCell),
    PolarSelectionChanged {
        selection: PolarSelection,
        members: Vec<ObjectRef>,
    },
}
