pub mod arc;
pub mod delta;
pub mod display;
pub mod ellipse;
pub mod shapes;
pub mod source;
pub mod station;
pub mod style;
pub mod theme;

pub use arc::*;
pub use delta::*;
pub use display::*;
pub use ellipse::*;
pub use shapes::*;
pub use source::*;
pub use station::*;
pub use style::*;
pub use theme::*;

use foundation::math::GeoPoint;

/// Labels drive the bulk `display_by_label` filter.
pub trait Labeled {
    fn label(&self) -> &str;
}

/// A stored object: its input spec, display state, and derived geometry.
///
/// `geometry` holds the materialized polyline for arcs, deltas, ellipses and
/// rectangles and is empty for every other kind. `changed` is set by a
/// change and cleared once the geometry has been rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<S> {
    pub spec: S,
    pub display: DisplayState,
    pub changed: bool,
    pub geometry: Vec<GeoPoint>,
}

impl<S> Entry<S> {
    pub fn new(spec: S, geometry: Vec<GeoPoint>) -> Self {
        Self {
            spec,
            display: DisplayState::default(),
            changed: false,
            geometry,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.display.is_visible()
    }
}

pub type Station = Entry<StationSpec>;
pub type Source = Entry<SourceSpec>;
pub type Arc = Entry<ArcSpec>;
pub type Delta = Entry<DeltaSpec>;
pub type Ellipse = Entry<EllipseSpec>;
pub type Line = Entry<LineSpec>;
pub type Polygon = Entry<PolygonSpec>;
pub type Rectangle = Entry<RectangleSpec>;
pub type SymbolGroup = Entry<SymbolGroupSpec>;
pub type CircleSet = Entry<CircleSpec>;
pub type Theme = Entry<ThemeSpec>;
