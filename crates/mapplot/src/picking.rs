//! Cursor-to-object picking.
//!
//! Categories are tried in a fixed order and the first one with a match
//! inside its threshold wins: polar-selection handles, stations and
//! sources, arcs and deltas, symbol-group symbols, then themes from the
//! top-most down. Within a category the smallest distance wins.

use foundation::ObjectId;
use foundation::math::{GeoPoint, Vec2, point_segment_distance_squared};
use layers::path::device_strokes;
use layers::scanline::covers;
use projection::{Projection, ProjectionKind, View};
use scene::components::{ShapeKind, ShapeTheme, ThemeVariant};
use scene::{MapWorld, ObjectKind, ObjectRef};
use serde::{Deserialize, Serialize};

use crate::polar::{PolarHandle, PolarSelection};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickThresholds {
    /// Squared pixel distance for point-like objects.
    pub point_distance_sq: f64,
    /// Line distance for hover and drag affordances.
    pub line_hover_px: f64,
    /// Line distance for explicit selection clicks.
    pub line_select_px: f64,
}

impl Default for PickThresholds {
    fn default() -> Self {
        Self {
            point_distance_sq: 400.0,
            line_hover_px: 5.0,
            line_select_px: 10.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PickMode {
    Hover,
    Select,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PickTarget {
    PolarHandle(PolarHandle),
    /// Station, source, arc or delta.
    Object(ObjectRef),
    Symbol { group: ObjectId, index: usize },
    ThemeShape { theme: ObjectId, index: usize },
    ThemeImage { theme: ObjectId, row: usize, col: usize },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pick {
    pub target: PickTarget,
    /// Device distance from the cursor; zero for area hits.
    pub distance_px: f64,
}

/// Keeps the closest candidate seen.
#[derive(Default)]
struct Nearest(Option<Pick>);

impl Nearest {
    fn offer(&mut self, target: PickTarget, distance_px: f64) {
        if self.0.is_none_or(|p| distance_px < p.distance_px) {
            self.0 = Some(Pick { target, distance_px });
        }
    }
}

pub struct Picker<'a> {
    world: &'a MapWorld,
    projection: &'a Projection,
    view: &'a View,
    thresholds: PickThresholds,
    polar: Option<&'a PolarSelection>,
}

impl<'a> Picker<'a> {
    pub fn new(world: &'a MapWorld, projection: &'a Projection, view: &'a View, thresholds: PickThresholds) -> Self {
        Self {
            world,
            projection,
            view,
            thresholds,
            polar: None,
        }
    }

    pub fn with_polar_selection(mut self, selection: Option<&'a PolarSelection>) -> Self {
        self.polar = selection;
        self
    }

    pub fn pick(&self, x: f64, y: f64, mode: PickMode) -> Option<Pick> {
        let cursor = Vec2::new(x, y);
        let line_px = match mode {
            PickMode::Hover => self.thresholds.line_hover_px,
            PickMode::Select => self.thresholds.line_select_px,
        };
        self.polar_handle(cursor, line_px)
            .or_else(|| self.points(cursor))
            .or_else(|| self.lines(cursor, line_px))
            .or_else(|| self.symbols(cursor))
            .or_else(|| self.themes(cursor, line_px))
    }

    fn device(&self, p: GeoPoint) -> Option<Vec2> {
        let q = self.projection.project(p);
        (q.visible && q.x.is_finite() && q.y.is_finite()).then(|| self.view.to_device(q.x, q.y))
    }

    fn point_distance(&self, cursor: Vec2, p: GeoPoint) -> Option<f64> {
        let d2 = self.device(p)?.distance_squared(cursor);
        (d2 <= self.thresholds.point_distance_sq).then(|| d2.sqrt())
    }

    fn path_distance(&self, cursor: Vec2, points: &[GeoPoint], closed: bool) -> Option<f64> {
        device_strokes(points, closed, self.projection, self.view)
            .iter()
            .flat_map(|s| s.windows(2))
            .map(|w| point_segment_distance_squared(cursor, w[0], w[1]))
            .min_by(f64::total_cmp)
            .map(f64::sqrt)
    }

    fn polar_handle(&self, cursor: Vec2, tol_px: f64) -> Option<Pick> {
        if self.projection.kind() != ProjectionKind::Polar {
            return None;
        }
        let (handle, d) = self.polar?.handle_at(self.view, cursor.x, cursor.y, tol_px)?;
        Some(Pick {
            target: PickTarget::PolarHandle(handle),
            distance_px: d,
        })
    }

    fn points(&self, cursor: Vec2) -> Option<Pick> {
        let mut best = Nearest::default();
        for (id, s) in self.world.stations().iter() {
            if let Some(d) = s.is_visible().then(|| self.point_distance(cursor, s.spec.point)).flatten() {
                best.offer(PickTarget::Object(ObjectRef::station(id)), d);
            }
        }
        for (id, s) in self.world.sources().iter() {
            if let Some(d) = s.is_visible().then(|| self.point_distance(cursor, s.spec.point)).flatten() {
                best.offer(PickTarget::Object(ObjectRef::source(id)), d);
            }
        }
        best.0
    }

    fn lines(&self, cursor: Vec2, tol_px: f64) -> Option<Pick> {
        let mut best = Nearest::default();
        for (id, arc) in self.world.arcs().iter() {
            if !arc.is_visible() {
                continue;
            }
            if let Some(d) = self.path_distance(cursor, &arc.geometry, false).filter(|d| *d <= tol_px) {
                best.offer(PickTarget::Object(ObjectRef::new(ObjectKind::Arc, id)), d);
            }
        }
        for (id, delta) in self.world.deltas().iter() {
            if !delta.is_visible() {
                continue;
            }
            if let Some(d) = self.path_distance(cursor, &delta.geometry, false).filter(|d| *d <= tol_px) {
                best.offer(PickTarget::Object(ObjectRef::new(ObjectKind::Delta, id)), d);
            }
        }
        best.0
    }

    fn symbols(&self, cursor: Vec2) -> Option<Pick> {
        let mut best = Nearest::default();
        for (group, entry) in self.world.symbol_groups().iter() {
            if !entry.is_visible() {
                continue;
            }
            for (index, s) in entry.spec.symbols.iter().enumerate() {
                if let Some(d) = self.point_distance(cursor, s.point) {
                    best.offer(PickTarget::Symbol { group, index }, d);
                }
            }
        }
        best.0
    }

    fn themes(&self, cursor: Vec2, tol_px: f64) -> Option<Pick> {
        let width = self.view.window().width();
        let themes: Vec<_> = self.world.themes().iter().collect();
        // Drawn last means on top.
        for (id, theme) in themes.into_iter().rev() {
            if !theme.is_visible() || !theme.spec.shown_at(width) {
                continue;
            }
            let hit = match &theme.spec.variant {
                ThemeVariant::Shape(shapes) => self.shape_theme(id, shapes, cursor, tol_px),
                ThemeVariant::Image(image) => self.cursor_point(cursor).and_then(|p| {
                    let (row, col) = image.grid.nearest(p)?;
                    Some(Pick {
                        target: PickTarget::ThemeImage { theme: id, row, col },
                        distance_px: 0.0,
                    })
                }),
            };
            if hit.is_some() {
                return hit;
            }
        }
        None
    }

    fn shape_theme(&self, theme: ObjectId, shapes: &ShapeTheme, cursor: Vec2, tol_px: f64) -> Option<Pick> {
        let mut best = Nearest::default();
        let pixel = self.cursor_pixel(cursor);
        for (index, shape) in shapes.shapes.iter().enumerate() {
            let target = PickTarget::ThemeShape { theme, index };
            match (shapes.kind, shape.kind) {
                (ShapeKind::Polygon, ShapeKind::Polygon) => {
                    if pixel.is_some_and(|(col, row)| covers(&shape.parts, self.projection, self.view, col, row)) {
                        best.offer(target, 0.0);
                        continue;
                    }
                    let boundary = shape
                        .parts
                        .iter()
                        .filter_map(|part| self.path_distance(cursor, part, true))
                        .min_by(f64::total_cmp);
                    if let Some(d) = boundary.filter(|d| *d <= tol_px) {
                        best.offer(target, d);
                    }
                }
                (ShapeKind::Point, _) => {
                    for p in shape.parts.iter().flatten() {
                        if let Some(d) = self.point_distance(cursor, *p) {
                            best.offer(target, d);
                        }
                    }
                }
                (ShapeKind::Polyline, _) | (ShapeKind::Polygon, _) => {
                    let closed = shapes.kind == ShapeKind::Polygon;
                    let d = shape
                        .parts
                        .iter()
                        .filter_map(|part| self.path_distance(cursor, part, closed))
                        .min_by(f64::total_cmp);
                    if let Some(d) = d.filter(|d| *d <= tol_px) {
                        best.offer(target, d);
                    }
                }
            }
        }
        best.0
    }

    fn cursor_pixel(&self, cursor: Vec2) -> Option<(u32, u32)> {
        let (w, h) = (f64::from(self.view.width()), f64::from(self.view.height()));
        (cursor.x >= 0.0 && cursor.y >= 0.0 && cursor.x < w && cursor.y < h)
            .then(|| (cursor.x.floor() as u32, cursor.y.floor() as u32))
    }

    fn cursor_point(&self, cursor: Vec2) -> Option<GeoPoint> {
        let p = self.view.to_plane(cursor.x, cursor.y);
        self.projection.unproject(p.x, p.y)
    }
}
