//! Pointer-driven state machine: dragging symbols, measurements, polar
//! selection editing and UTM cell selection.
//!
//! Every transition completes inside one pointer handler call.

use foundation::math::{GeoPoint, lon_delta};
use projection::{Projection, ProjectionKind, UtmCell, View};
use runtime::{EventBus, Frame, Redisplay, Redraw};
use scene::components::{DisplayMode, ThemeVariant};
use scene::{MapWorld, ObjectKind, ObjectRef, StoreResult};
use tracing::{debug, info};

use crate::config::MapConfig;
use crate::events::{CursorInfo, MapEvent, SelectionTarget};
use crate::measure::Measurement;
use crate::picking::{PickMode, PickTarget, Picker};
use crate::polar::{PolarHandle, PolarSelection, polar_coords};
use crate::utm_select::{cell_under, enter_cell};

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionState {
    Idle,
    DraggingPoint {
        target: ObjectRef,
        from: GeoPoint,
        /// Last on-map cursor position; `None` until the cursor moves onto
        /// the projected world.
        at: Option<GeoPoint>,
        moved: bool,
        restore: DisplayMode,
    },
    DraggingMeasurement(Measurement),
    SizingPolarSelection(PolarHandle),
    MovingPolarSelection {
        /// Polar-plane `(distance, azimuth)` of the previous cursor sample.
        last: (f64, f64),
    },
    SelectingUtmCell {
        hover: Option<UtmCell>,
    },
}

/// Everything a pointer handler may touch.
pub struct Context<'a> {
    pub world: &'a mut MapWorld,
    pub projection: &'a mut Projection,
    pub view: &'a mut View,
    pub events: &'a mut EventBus<MapEvent>,
    pub redisplay: &'a mut Redisplay,
    pub frame: Frame,
    pub config: &'a MapConfig,
}

impl Context<'_> {
    fn emit(&mut self, event: MapEvent) {
        self.events.emit(self.frame, event);
    }

    fn geo_at(&self, x: f64, y: f64) -> Option<GeoPoint> {
        let p = self.view.to_plane(x, y);
        self.projection.unproject(p.x, p.y)
    }

    fn polar_at(&self, x: f64, y: f64) -> (f64, f64) {
        polar_coords(self.view.to_plane(x, y))
    }
}

/// What lies under device point `(x, y)`.
pub fn cursor_info(world: &MapWorld, projection: &Projection, view: &View, x: f64, y: f64) -> CursorInfo {
    let plane = view.to_plane(x, y);
    let point = projection.unproject(plane.x, plane.y);
    let utm_cell = match projection.kind() {
        ProjectionKind::UtmNear => projection.utm_cell(),
        _ => point.and_then(UtmCell::containing),
    };
    let width = view.window().width();
    let value = point.and_then(|p| {
        let themes: Vec<_> = world.themes().iter().collect();
        themes.into_iter().rev().find_map(|(_, theme)| match &theme.spec.variant {
            ThemeVariant::Image(image) if theme.is_visible() && theme.spec.shown_at(width) => {
                image.grid.value_at(p)
            }
            _ => None,
        })
    });
    CursorInfo {
        x,
        y,
        point,
        utm_cell,
        value,
    }
}

#[derive(Debug, Clone)]
pub struct Interaction {
    state: InteractionState,
    polar: Option<PolarSelection>,
    measurements: Vec<Measurement>,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Interaction {
    pub fn new() -> Self {
        Self {
            state: InteractionState::Idle,
            polar: None,
            measurements: Vec::new(),
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn polar_selection(&self) -> Option<&PolarSelection> {
        self.polar.as_ref()
    }

    pub fn set_polar_selection(&mut self, selection: Option<PolarSelection>) {
        self.polar = selection;
    }

    /// Finished measurements still in the store.
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Next pointer-down picks a UTM cell instead of an object.
    pub fn begin_utm_selection(&mut self) {
        self.state = InteractionState::SelectingUtmCell { hover: None };
    }

    /// Abandons the current gesture: a dragged symbol goes back unchanged
    /// and an unfinished measurement is removed.
    pub fn cancel(&mut self, ctx: &mut Context<'_>) -> StoreResult<()> {
        match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::DraggingPoint { target, restore, .. } => {
                ctx.world.set_display(target, restore)?;
                ctx.redisplay.request(Redraw::Overlays);
            }
            InteractionState::DraggingMeasurement(m) => self.discard_measurement(ctx, m)?,
            _ => {}
        }
        Ok(())
    }

    pub fn pointer_down(&mut self, ctx: &mut Context<'_>, x: f64, y: f64) -> StoreResult<()> {
        if let InteractionState::SelectingUtmCell { .. } = self.state {
            if let Some(cell) = cell_under(ctx.projection, ctx.view, x, y) {
                enter_cell(ctx.projection, ctx.view, cell);
                ctx.emit(MapEvent::UtmCellEntered(cell));
                ctx.redisplay.request(Redraw::Full);
                self.state = InteractionState::Idle;
            }
            return Ok(());
        }
        if self.state != InteractionState::Idle {
            self.cancel(ctx)?;
        }
        self.measurements.retain(|m| m.is_live(ctx.world));

        let pick = Picker::new(ctx.world, ctx.projection, ctx.view, ctx.config.picking)
            .with_polar_selection(self.polar.as_ref())
            .pick(x, y, PickMode::Select);
        let Some(pick) = pick else {
            return self.press_empty(ctx, x, y);
        };
        debug!(picked = ?pick.target, distance = pick.distance_px, "pointer down");
        match pick.target {
            PickTarget::PolarHandle(PolarHandle::Interior) => {
                self.state = InteractionState::MovingPolarSelection { last: ctx.polar_at(x, y) };
            }
            PickTarget::PolarHandle(handle) => {
                self.state = InteractionState::SizingPolarSelection(handle);
            }
            PickTarget::Object(target) => match target.kind {
                ObjectKind::Station | ObjectKind::Source => self.press_point(ctx, target)?,
                _ => self.press_line(ctx, target)?,
            },
            PickTarget::Symbol { group, index } => {
                let selected = toggle(ctx.world, ObjectRef::new(ObjectKind::SymbolGroup, group))?;
                ctx.emit(MapEvent::SelectionChanged {
                    target: SelectionTarget::Symbol { group, index },
                    selected,
                });
                ctx.redisplay.request(Redraw::Overlays);
            }
            PickTarget::ThemeShape { theme, index } => {
                let selected = !ctx.world.theme(theme).is_some_and(|t| match &t.spec.variant {
                    ThemeVariant::Shape(shapes) => shapes.selected.contains(&index),
                    ThemeVariant::Image(_) => false,
                });
                ctx.world.select_theme_shape(theme, index, selected)?;
                ctx.emit(MapEvent::SelectionChanged {
                    target: SelectionTarget::ThemeShape { theme, index },
                    selected,
                });
                ctx.redisplay.request(Redraw::Overlays);
            }
            PickTarget::ThemeImage { .. } => return self.press_empty(ctx, x, y),
        }
        Ok(())
    }

    fn press_empty(&mut self, ctx: &mut Context<'_>, x: f64, y: f64) -> StoreResult<()> {
        if !ctx.config.measurement_enabled {
            return Ok(());
        }
        if let Some(origin) = ctx.geo_at(x, y) {
            self.start_measurement(ctx, origin, None)?;
        }
        Ok(())
    }

    fn press_point(&mut self, ctx: &mut Context<'_>, target: ObjectRef) -> StoreResult<()> {
        let movable = match target.kind {
            ObjectKind::Station => ctx.config.movable.stations,
            _ => ctx.config.movable.sources,
        };
        let (Some(from), Some(display)) = (ctx.world.point_of(target), ctx.world.display(target)) else {
            return Ok(());
        };
        if movable {
            ctx.world.set_display(target, DisplayMode::Off)?;
            self.state = InteractionState::DraggingPoint {
                target,
                from,
                at: None,
                moved: false,
                restore: display.mode,
            };
            ctx.redisplay.request(Redraw::Overlays);
            return Ok(());
        }
        self.select_object(ctx, target)?;
        if ctx.config.measurement_enabled {
            self.start_measurement(ctx, from, Some(target))?;
        }
        Ok(())
    }

    fn press_line(&mut self, ctx: &mut Context<'_>, target: ObjectRef) -> StoreResult<()> {
        if ctx.config.measurement_enabled
            && let Some(i) = self.measurements.iter().position(|m| m.owns(target))
        {
            let m = self.measurements.swap_remove(i);
            debug!(arc = %m.arc, "measurement resumed");
            self.state = InteractionState::DraggingMeasurement(m);
            return Ok(());
        }
        self.select_object(ctx, target)
    }

    fn select_object(&mut self, ctx: &mut Context<'_>, target: ObjectRef) -> StoreResult<()> {
        let selected = toggle(ctx.world, target)?;
        ctx.emit(MapEvent::SelectionChanged {
            target: SelectionTarget::Object(target),
            selected,
        });
        ctx.redisplay.request(Redraw::Overlays);
        Ok(())
    }

    fn start_measurement(&mut self, ctx: &mut Context<'_>, origin: GeoPoint, anchor: Option<ObjectRef>) -> StoreResult<()> {
        let m = Measurement::start(ctx.world, origin, anchor)?;
        ctx.emit(MapEvent::MeasurementCreated {
            arc: m.arc,
            delta: m.delta,
            origin,
        });
        ctx.redisplay.request(Redraw::Overlays);
        self.state = InteractionState::DraggingMeasurement(m);
        Ok(())
    }

    fn discard_measurement(&mut self, ctx: &mut Context<'_>, m: Measurement) -> StoreResult<()> {
        m.delete(ctx.world)?;
        ctx.emit(MapEvent::MeasurementDeleted {
            arc: m.arc,
            delta: m.delta,
        });
        ctx.redisplay.request(Redraw::Overlays);
        Ok(())
    }

    pub fn pointer_move(&mut self, ctx: &mut Context<'_>, x: f64, y: f64) -> StoreResult<CursorInfo> {
        let info = cursor_info(ctx.world, ctx.projection, ctx.view, x, y);
        ctx.emit(MapEvent::CursorMotion(info));
        if ctx.config.crosshair {
            ctx.redisplay.request(Redraw::Cursor);
        }
        let polar_at = ctx.polar_at(x, y);
        match &mut self.state {
            InteractionState::Idle => {}
            InteractionState::DraggingPoint { target, at, moved, .. } => {
                *at = info.point;
                *moved = true;
                if let Some(point) = info.point {
                    let target = *target;
                    ctx.emit(MapEvent::DragMoved { target, point });
                }
                ctx.redisplay.request(Redraw::Overlays);
            }
            InteractionState::DraggingMeasurement(m) => {
                if let Some(to) = info.point {
                    let d = m.update(ctx.world, to)?;
                    let (arc, delta) = (m.arc, m.delta);
                    ctx.emit(MapEvent::MeasurementUpdated {
                        arc,
                        delta,
                        distance_deg: d.delta,
                        azimuth_deg: d.az,
                    });
                    ctx.redisplay.request(Redraw::Overlays);
                }
            }
            InteractionState::SizingPolarSelection(handle) => {
                if let Some(sel) = self.polar.as_mut() {
                    sel.resize(*handle, polar_at.0, polar_at.1);
                    ctx.redisplay.request(Redraw::Overlays);
                }
            }
            InteractionState::MovingPolarSelection { last } => {
                if let Some(sel) = self.polar.as_mut() {
                    sel.translate(polar_at.0 - last.0, lon_delta(last.1, polar_at.1));
                    ctx.redisplay.request(Redraw::Overlays);
                }
                *last = polar_at;
            }
            InteractionState::SelectingUtmCell { hover } => {
                let cell = cell_under(ctx.projection, ctx.view, x, y);
                if *hover != cell {
                    *hover = cell;
                    ctx.redisplay.request(Redraw::Overlays);
                }
            }
        }
        Ok(info)
    }

    pub fn pointer_up(&mut self, ctx: &mut Context<'_>, x: f64, y: f64) -> StoreResult<()> {
        match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::Idle => {}
            InteractionState::DraggingPoint {
                target,
                from,
                moved,
                restore,
                ..
            } => {
                ctx.world.set_display(target, restore)?;
                ctx.redisplay.request(Redraw::Overlays);
                if !moved {
                    // Pressed and released without moving: a click.
                    return self.select_object(ctx, target);
                }
                match ctx.geo_at(x, y) {
                    Some(to) => {
                        let carried = ctx.world.move_point(target, to)?;
                        for m in self.measurements.iter_mut().filter(|m| m.anchor == Some(target)) {
                            m.follow_anchor(ctx.world, to)?;
                        }
                        info!(object = %target, lat = to.lat, lon = to.lon, dependents = carried.len(), "drag committed");
                        ctx.emit(MapEvent::DragCommitted { target, from, to });
                    }
                    None => debug!(object = %target, "drag released off the map; nothing changed"),
                }
            }
            InteractionState::DraggingMeasurement(mut m) => {
                if let Some(to) = ctx.geo_at(x, y)
                    && !to.approx_eq(m.to, 1e-12)
                {
                    m.update(ctx.world, to)?;
                }
                if m.is_degenerate() {
                    self.discard_measurement(ctx, m)?;
                } else {
                    let d = m.distance();
                    info!(distance_deg = d.delta, azimuth_deg = d.az, "measurement finished");
                    self.measurements.push(m);
                }
            }
            InteractionState::SizingPolarSelection(_) | InteractionState::MovingPolarSelection { .. } => {
                if let Some(selection) = self.polar {
                    let members = selection.members(ctx.world, ctx.projection);
                    ctx.emit(MapEvent::PolarSelectionChanged { selection, members });
                }
            }
            selecting @ InteractionState::SelectingUtmCell { .. } => self.state = selecting,
        }
        Ok(())
    }
}

/// Flips the selected flag of `target`; returns the new value.
fn toggle(world: &mut MapWorld, target: ObjectRef) -> StoreResult<bool> {
    let selected = !world.display(target).is_some_and(|d| d.selected);
    world.set_selected(target, selected)?;
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::bounds::Aabb2;
    use scene::components::StationSpec;

    struct Harness {
        world: MapWorld,
        projection: Projection,
        view: View,
        events: EventBus<MapEvent>,
        redisplay: Redisplay,
        config: MapConfig,
    }

    impl Harness {
        fn new(config: MapConfig) -> Self {
            Self {
                world: MapWorld::new(),
                projection: Projection::new(ProjectionKind::LinearCylindrical),
                view: View::new(Aabb2::new([-180.0, -90.0], [180.0, 90.0]), 360, 180),
                events: EventBus::new(),
                redisplay: Redisplay::new(),
                config,
            }
        }

        fn ctx(&mut self) -> Context<'_> {
            Context {
                world: &mut self.world,
                projection: &mut self.projection,
                view: &mut self.view,
                events: &mut self.events,
                redisplay: &mut self.redisplay,
                frame: Frame::default(),
                config: &self.config,
            }
        }
    }

    #[test]
    fn drag_hides_then_commits() {
        let mut config = MapConfig::default();
        config.movable.stations = true;
        let mut h = Harness::new(config);
        let st = h
            .world
            .add_station(StationSpec::new("ST", GeoPoint::new(0.0, 0.0)))
            .unwrap();
        let target = ObjectRef::station(st);
        let mut ix = Interaction::new();

        ix.pointer_down(&mut h.ctx(), 180.0, 90.0).unwrap();
        assert!(matches!(ix.state(), InteractionState::DraggingPoint { .. }));
        assert!(!h.world.display(target).unwrap().is_visible());

        ix.pointer_move(&mut h.ctx(), 200.0, 80.0).unwrap();
        ix.pointer_up(&mut h.ctx(), 200.0, 80.0).unwrap();
        assert_eq!(ix.state(), &InteractionState::Idle);
        assert!(h.world.display(target).unwrap().is_visible());
        assert!(h.world.station(st).unwrap().spec.point.approx_eq(GeoPoint::new(10.0, 20.0), 1e-9));
        assert!(h.events.events().iter().any(|e| matches!(e.event, MapEvent::DragCommitted { .. })));
    }

    #[test]
    fn click_without_motion_selects() {
        let mut config = MapConfig::default();
        config.movable.stations = true;
        let mut h = Harness::new(config);
        let st = h
            .world
            .add_station(StationSpec::new("ST", GeoPoint::new(0.0, 0.0)))
            .unwrap();
        let mut ix = Interaction::new();
        ix.pointer_down(&mut h.ctx(), 180.0, 90.0).unwrap();
        ix.pointer_up(&mut h.ctx(), 180.0, 90.0).unwrap();
        let state = h.world.display(ObjectRef::station(st)).unwrap();
        assert!(state.selected);
        assert_eq!(state.mode, DisplayMode::SelectedOn);
    }

    #[test]
    fn fixed_station_toggles_selection() {
        let mut h = Harness::new(MapConfig::default());
        let st = h
            .world
            .add_station(StationSpec::new("ST", GeoPoint::new(0.0, 0.0)))
            .unwrap();
        let mut ix = Interaction::new();
        for expected in [true, false] {
            ix.pointer_down(&mut h.ctx(), 181.0, 91.0).unwrap();
            ix.pointer_up(&mut h.ctx(), 181.0, 91.0).unwrap();
            assert_eq!(h.world.display(ObjectRef::station(st)).unwrap().selected, expected);
        }
        assert_eq!(h.events.events().len(), 2);
    }

    #[test]
    fn measurement_from_empty_space() {
        let mut config = MapConfig::default();
        config.measurement_enabled = true;
        let mut h = Harness::new(config);
        let mut ix = Interaction::new();

        ix.pointer_down(&mut h.ctx(), 180.0, 90.0).unwrap();
        ix.pointer_move(&mut h.ctx(), 210.0, 90.0).unwrap();
        ix.pointer_up(&mut h.ctx(), 210.0, 90.0).unwrap();
        assert_eq!(ix.measurements().len(), 1);
        let m = &ix.measurements()[0];
        assert!((m.distance().delta - 30.0).abs() < 1e-9);
        assert_eq!(h.world.object_count(), 2);

        // A press and release on one spot leaves nothing behind.
        ix.pointer_down(&mut h.ctx(), 100.0, 40.0).unwrap();
        ix.pointer_up(&mut h.ctx(), 100.0, 40.0).unwrap();
        assert_eq!(h.world.object_count(), 2);
        assert!(h.events.events().iter().any(|e| matches!(e.event, MapEvent::MeasurementDeleted { .. })));
    }

    #[test]
    fn cursor_info_reports_cell() {
        let h = Harness::new(MapConfig::default());
        let info = cursor_info(&h.world, &h.projection, &h.view, 183.5, 45.5);
        let p = info.point.unwrap();
        assert!((p.lat - 44.5).abs() < 1e-9 && (p.lon - 3.5).abs() < 1e-9);
        assert_eq!(info.utm_cell.map(|c| c.label()), Some("31T".to_string()));
        assert_eq!(info.value, None);
    }
}
