use std::collections::BTreeMap;
use std::fmt;

use foundation::math::{GeoPoint, destination, distance_azimuth};
use foundation::{Arena, IdAllocator, ObjectId};
use tracing::{debug, info};

use crate::components::{
    Arc, ArcSpec, CircleSet, CircleSpec, Color, ColorScale, Delta, DeltaSpec, DisplayMode,
    DisplayState, Ellipse, EllipseSpec, Entry, Labeled, Line, LineSpec, Polygon, PolygonSpec,
    Rectangle, RectangleSpec, Source, SourceSpec, Station, StationSpec, SymbolGroup,
    SymbolGroupSpec, Theme, ThemeSpec, ThemeVariant,
};
use crate::config::MaterializeConfig;
use crate::entity::{ObjectKind, ObjectRef};
use crate::error::{StoreError, StoreResult};
use crate::materialize::{arc_path, delta_ring, ellipse_ring, rectangle_ring};
use crate::mirror::{Mutation, ObjectSpec, StoreObserver, ThemeEdit};
use crate::selection::SelectionSet;

/// Tolerance for an arc end to count as sitting on its anchor.
const ANCHOR_EPS_DEG: f64 = 1e-6;

/// The live set of map objects, one arena per category.
///
/// Ids come from a single allocator and are unique across categories.
/// Deleting a station or source also deletes the arcs and deltas anchored
/// to it, and a source's owned ellipse.
#[derive(Default)]
pub struct MapWorld {
    ids: IdAllocator,
    config: MaterializeConfig,
    stations: Arena<Station>,
    sources: Arena<Source>,
    arcs: Arena<Arc>,
    deltas: Arena<Delta>,
    ellipses: Arena<Ellipse>,
    lines: Arena<Line>,
    polygons: Arena<Polygon>,
    rectangles: Arena<Rectangle>,
    symbol_groups: Arena<SymbolGroup>,
    circles: Arena<CircleSet>,
    themes: Arena<Theme>,
    source_ellipses: BTreeMap<ObjectId, ObjectId>,
    mirrors: Vec<Box<dyn StoreObserver>>,
    revision: u64,
}

impl fmt::Debug for MapWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapWorld")
            .field("objects", &self.object_count())
            .field("mirrors", &self.mirrors.len())
            .field("revision", &self.revision)
            .finish()
    }
}

impl MapWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MaterializeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Store drawing ids from a pre-positioned allocator.
    pub fn with_id_allocator(ids: IdAllocator) -> Self {
        Self {
            ids,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &MaterializeConfig {
        &self.config
    }

    /// Bumped by every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn attach_mirror(&mut self, mirror: Box<dyn StoreObserver>) {
        self.mirrors.push(mirror);
    }

    pub fn mirror_count(&self) -> usize {
        self.mirrors.len()
    }

    // ---- queries ----

    pub fn object_count(&self) -> usize {
        self.stations.len()
            + self.sources.len()
            + self.arcs.len()
            + self.deltas.len()
            + self.ellipses.len()
            + self.lines.len()
            + self.polygons.len()
            + self.rectangles.len()
            + self.symbol_groups.len()
            + self.circles.len()
            + self.themes.len()
    }

    pub fn kind_of(&self, id: ObjectId) -> Option<ObjectKind> {
        ObjectKind::ALL
            .into_iter()
            .find(|&kind| self.contains(ObjectRef::new(kind, id)))
    }

    pub fn contains(&self, target: ObjectRef) -> bool {
        self.display(target).is_some()
    }

    pub fn stations(&self) -> &Arena<Station> {
        &self.stations
    }

    pub fn sources(&self) -> &Arena<Source> {
        &self.sources
    }

    pub fn arcs(&self) -> &Arena<Arc> {
        &self.arcs
    }

    pub fn deltas(&self) -> &Arena<Delta> {
        &self.deltas
    }

    pub fn ellipses(&self) -> &Arena<Ellipse> {
        &self.ellipses
    }

    pub fn lines(&self) -> &Arena<Line> {
        &self.lines
    }

    pub fn polygons(&self) -> &Arena<Polygon> {
        &self.polygons
    }

    pub fn rectangles(&self) -> &Arena<Rectangle> {
        &self.rectangles
    }

    pub fn symbol_groups(&self) -> &Arena<SymbolGroup> {
        &self.symbol_groups
    }

    pub fn circles(&self) -> &Arena<CircleSet> {
        &self.circles
    }

    pub fn themes(&self) -> &Arena<Theme> {
        &self.themes
    }

    pub fn station(&self, id: ObjectId) -> Option<&Station> {
        self.stations.get(id)
    }

    pub fn source(&self, id: ObjectId) -> Option<&Source> {
        self.sources.get(id)
    }

    pub fn arc(&self, id: ObjectId) -> Option<&Arc> {
        self.arcs.get(id)
    }

    pub fn delta(&self, id: ObjectId) -> Option<&Delta> {
        self.deltas.get(id)
    }

    pub fn ellipse(&self, id: ObjectId) -> Option<&Ellipse> {
        self.ellipses.get(id)
    }

    pub fn line(&self, id: ObjectId) -> Option<&Line> {
        self.lines.get(id)
    }

    pub fn polygon(&self, id: ObjectId) -> Option<&Polygon> {
        self.polygons.get(id)
    }

    pub fn rectangle(&self, id: ObjectId) -> Option<&Rectangle> {
        self.rectangles.get(id)
    }

    pub fn symbol_group(&self, id: ObjectId) -> Option<&SymbolGroup> {
        self.symbol_groups.get(id)
    }

    pub fn circle_set(&self, id: ObjectId) -> Option<&CircleSet> {
        self.circles.get(id)
    }

    pub fn theme(&self, id: ObjectId) -> Option<&Theme> {
        self.themes.get(id)
    }

    /// Ellipse owned by `source`, if any.
    pub fn source_ellipse(&self, source: ObjectId) -> Option<ObjectId> {
        self.source_ellipses.get(&source).copied()
    }

    /// Point geometry of a station or source.
    pub fn point_of(&self, target: ObjectRef) -> Option<GeoPoint> {
        match target.kind {
            ObjectKind::Station => self.stations.get(target.id).map(|s| s.spec.point),
            ObjectKind::Source => self.sources.get(target.id).map(|s| s.spec.point),
            _ => None,
        }
    }

    /// Arcs and deltas anchored to `anchor`.
    pub fn dependents_of(&self, anchor: ObjectRef) -> Vec<ObjectRef> {
        let arcs = self
            .arcs
            .ids_where(|a| a.spec.anchors.contains(&anchor))
            .into_iter()
            .map(|id| ObjectRef::new(ObjectKind::Arc, id));
        let deltas = self
            .deltas
            .ids_where(|d| d.spec.anchors.contains(&anchor))
            .into_iter()
            .map(|id| ObjectRef::new(ObjectKind::Delta, id));
        arcs.chain(deltas).collect()
    }

    // ---- add ----

    pub fn add_station(&mut self, spec: StationSpec) -> StoreResult<ObjectId> {
        self.add(ObjectSpec::Station(spec))
    }

    /// Adds a source; a source with ellipse axes also gets an owned ellipse.
    pub fn add_source(&mut self, spec: SourceSpec) -> StoreResult<ObjectId> {
        self.add(ObjectSpec::Source {
            spec,
            ellipse: None,
        })
    }

    pub fn add_arc(&mut self, spec: ArcSpec) -> StoreResult<ObjectId> {
        self.add(ObjectSpec::Arc(spec))
    }

    pub fn add_delta(&mut self, spec: DeltaSpec) -> StoreResult<ObjectId> {
        self.add(ObjectSpec::Delta(spec))
    }

    pub fn add_ellipse(&mut self, spec: EllipseSpec) -> StoreResult<ObjectId> {
        self.add(ObjectSpec::Ellipse(spec))
    }

    pub fn add_line(&mut self, spec: LineSpec) -> StoreResult<ObjectId> {
        self.add(ObjectSpec::Line(spec))
    }

    pub fn add_polygon(&mut self, spec: PolygonSpec) -> StoreResult<ObjectId> {
        self.add(ObjectSpec::Polygon(spec))
    }

    pub fn add_rectangle(&mut self, spec: RectangleSpec) -> StoreResult<ObjectId> {
        self.add(ObjectSpec::Rectangle(spec))
    }

    pub fn add_symbol_group(&mut self, spec: SymbolGroupSpec) -> StoreResult<ObjectId> {
        self.add(ObjectSpec::SymbolGroup(spec))
    }

    pub fn add_circles(&mut self, spec: CircleSpec) -> StoreResult<ObjectId> {
        self.add(ObjectSpec::Circle(spec))
    }

    pub fn add_theme(&mut self, spec: ThemeSpec) -> StoreResult<ObjectId> {
        self.add(ObjectSpec::Theme(spec))
    }

    fn add(&mut self, spec: ObjectSpec) -> StoreResult<ObjectId> {
        let id = self.allocate_id();
        let spec = match spec {
            ObjectSpec::Source { spec, .. } if spec.ellipse.is_some() => {
                let ellipse = Some(self.allocate_id());
                ObjectSpec::Source { spec, ellipse }
            }
            other => other,
        };
        let kind = spec.kind();
        let echo = (!self.mirrors.is_empty()).then(|| spec.clone());
        self.insert(id, spec)?;
        self.revision += 1;
        debug!(%kind, %id, "object added");
        if let Some(spec) = echo {
            self.notify(&Mutation::Add { id, spec });
        }
        Ok(id)
    }

    fn allocate_id(&mut self) -> ObjectId {
        let mut ids = self.ids.clone();
        let id = ids.allocate(|id| self.kind_of(id).is_some());
        self.ids = ids;
        id
    }

    /// Inserts under a caller-chosen id. Derived geometry is built before
    /// anything is inserted so a failure leaves the store untouched.
    fn insert(&mut self, id: ObjectId, spec: ObjectSpec) -> StoreResult<()> {
        match spec {
            ObjectSpec::Station(s) => {
                self.stations.insert(id, Entry::new(s, Vec::new()));
            }
            ObjectSpec::Source { spec, ellipse } => {
                if let (Some(axes), Some(eid)) = (spec.ellipse, ellipse) {
                    let mut es = EllipseSpec::new(spec.point, axes);
                    es.label = spec.label.clone();
                    es.owner = Some(id);
                    let ring = ellipse_ring(&es, &self.config)?;
                    self.ellipses.insert(eid, Entry::new(es, ring));
                    self.source_ellipses.insert(id, eid);
                }
                self.sources.insert(id, Entry::new(spec, Vec::new()));
            }
            ObjectSpec::Arc(s) => {
                self.check_anchors(&s.anchors)?;
                let path = arc_path(&s, &self.config)?;
                self.arcs.insert(id, Entry::new(s, path));
            }
            ObjectSpec::Delta(s) => {
                self.check_anchors(&s.anchors)?;
                let ring = delta_ring(&s, &self.config)?;
                self.deltas.insert(id, Entry::new(s, ring));
            }
            ObjectSpec::Ellipse(s) => {
                let ring = ellipse_ring(&s, &self.config)?;
                self.ellipses.insert(id, Entry::new(s, ring));
            }
            ObjectSpec::Line(s) => {
                if s.points.len() < 2 {
                    return Err(StoreError::MalformedGeometry(format!(
                        "line needs two points, got {}",
                        s.points.len()
                    )));
                }
                self.lines.insert(id, Entry::new(s, Vec::new()));
            }
            ObjectSpec::Polygon(s) => {
                if s.ring.len() < 3 {
                    return Err(StoreError::MalformedGeometry(format!(
                        "polygon needs three vertices, got {}",
                        s.ring.len()
                    )));
                }
                self.polygons.insert(id, Entry::new(s, Vec::new()));
            }
            ObjectSpec::Rectangle(s) => {
                let ring = rectangle_ring(&s, &self.config)?;
                self.rectangles.insert(id, Entry::new(s, ring));
            }
            ObjectSpec::SymbolGroup(s) => {
                self.symbol_groups.insert(id, Entry::new(s, Vec::new()));
            }
            ObjectSpec::Circle(s) => {
                self.circles.insert(id, Entry::new(s, Vec::new()));
            }
            ObjectSpec::Theme(s) => {
                if let ThemeVariant::Image(image) = &s.variant {
                    image.grid.validate().map_err(StoreError::MalformedGeometry)?;
                }
                self.themes.insert(id, Entry::new(s, Vec::new()));
            }
        }
        Ok(())
    }

    fn check_anchors(&self, anchors: &[ObjectRef]) -> StoreResult<()> {
        for anchor in anchors {
            match anchor.kind {
                ObjectKind::Station | ObjectKind::Source => {
                    if !self.contains(*anchor) {
                        return Err(StoreError::NotFound {
                            kind: anchor.kind,
                            id: anchor.id,
                        });
                    }
                }
                found => {
                    return Err(StoreError::KindMismatch {
                        expected: ObjectKind::Station,
                        found,
                    });
                }
            }
        }
        Ok(())
    }

    // ---- change ----

    pub fn change_station(&mut self, id: ObjectId, spec: StationSpec) -> StoreResult<()> {
        self.change(id, ObjectSpec::Station(spec))
    }

    /// Replaces a source. Its owned ellipse follows: created, moved or
    /// removed to match the new ellipse axes.
    pub fn change_source(&mut self, id: ObjectId, spec: SourceSpec) -> StoreResult<()> {
        if !self.sources.contains(id) {
            return Err(StoreError::NotFound {
                kind: ObjectKind::Source,
                id,
            });
        }
        let ellipse = match (spec.ellipse, self.source_ellipse(id)) {
            (Some(_), Some(eid)) => Some(eid),
            (Some(_), None) => Some(self.allocate_id()),
            (None, _) => None,
        };
        self.change(id, ObjectSpec::Source { spec, ellipse })
    }

    pub fn change_arc(&mut self, id: ObjectId, spec: ArcSpec) -> StoreResult<()> {
        self.change(id, ObjectSpec::Arc(spec))
    }

    pub fn change_delta(&mut self, id: ObjectId, spec: DeltaSpec) -> StoreResult<()> {
        self.change(id, ObjectSpec::Delta(spec))
    }

    pub fn change_ellipse(&mut self, id: ObjectId, spec: EllipseSpec) -> StoreResult<()> {
        self.change(id, ObjectSpec::Ellipse(spec))
    }

    pub fn change_line(&mut self, id: ObjectId, spec: LineSpec) -> StoreResult<()> {
        self.change(id, ObjectSpec::Line(spec))
    }

    pub fn change_polygon(&mut self, id: ObjectId, spec: PolygonSpec) -> StoreResult<()> {
        self.change(id, ObjectSpec::Polygon(spec))
    }

    pub fn change_rectangle(&mut self, id: ObjectId, spec: RectangleSpec) -> StoreResult<()> {
        self.change(id, ObjectSpec::Rectangle(spec))
    }

    pub fn change_symbol_group(&mut self, id: ObjectId, spec: SymbolGroupSpec) -> StoreResult<()> {
        self.change(id, ObjectSpec::SymbolGroup(spec))
    }

    pub fn change_circles(&mut self, id: ObjectId, spec: CircleSpec) -> StoreResult<()> {
        self.change(id, ObjectSpec::Circle(spec))
    }

    pub fn change_theme(&mut self, id: ObjectId, spec: ThemeSpec) -> StoreResult<()> {
        self.change(id, ObjectSpec::Theme(spec))
    }

    /// Moves a station or source and carries its anchored arcs and deltas
    /// along. Returns the dependents that were rewritten.
    ///
    /// An arc starting at the old point keeps its length and azimuth,
    /// unless its far end sits on another of its anchors; then that end
    /// stays put. An arc ending at the old point is re-aimed at the new one.
    pub fn move_point(&mut self, target: ObjectRef, to: GeoPoint) -> StoreResult<Vec<ObjectRef>> {
        if !matches!(target.kind, ObjectKind::Station | ObjectKind::Source) {
            return Err(StoreError::KindMismatch {
                expected: ObjectKind::Station,
                found: target.kind,
            });
        }
        let from = self.point_of(target).ok_or(StoreError::NotFound {
            kind: target.kind,
            id: target.id,
        })?;
        match target.kind {
            ObjectKind::Station => {
                if let Some(mut spec) = self.station(target.id).map(|s| s.spec.clone()) {
                    spec.point = to;
                    self.change_station(target.id, spec)?;
                }
            }
            ObjectKind::Source => {
                if let Some(mut spec) = self.source(target.id).map(|s| s.spec.clone()) {
                    spec.point = to;
                    self.change_source(target.id, spec)?;
                }
            }
            _ => {}
        }

        let dependents = self.dependents_of(target);
        for dep in &dependents {
            match dep.kind {
                ObjectKind::Arc => {
                    let Some(mut spec) = self.arc(dep.id).map(|a| a.spec.clone()) else {
                        continue;
                    };
                    let end = destination(spec.origin, spec.distance_deg, spec.azimuth_deg);
                    let at_origin = spec.origin.approx_eq(from, ANCHOR_EPS_DEG);
                    if !at_origin && end.approx_eq(from, ANCHOR_EPS_DEG) {
                        let da = distance_azimuth(spec.origin, to);
                        (spec.distance_deg, spec.azimuth_deg) = (da.delta, da.az);
                    } else if self.pinned_end(&spec.anchors, target, end) {
                        let da = distance_azimuth(to, end);
                        (spec.distance_deg, spec.azimuth_deg) = (da.delta, da.az);
                        spec.origin = to;
                    } else {
                        spec.origin = to;
                    }
                    self.change_arc(dep.id, spec)?;
                }
                ObjectKind::Delta => {
                    if let Some(mut spec) = self.delta(dep.id).map(|d| d.spec.clone()) {
                        spec.origin = to;
                        self.change_delta(dep.id, spec)?;
                    }
                }
                _ => {}
            }
        }
        debug!(object = %target, dependents = dependents.len(), "point moved");
        Ok(dependents)
    }

    /// Whether `end` sits on one of `anchors` other than `moving`.
    fn pinned_end(&self, anchors: &[ObjectRef], moving: ObjectRef, end: GeoPoint) -> bool {
        anchors
            .iter()
            .filter(|a| **a != moving)
            .filter_map(|a| self.point_of(*a))
            .any(|p| p.approx_eq(end, ANCHOR_EPS_DEG))
    }

    fn change(&mut self, id: ObjectId, spec: ObjectSpec) -> StoreResult<()> {
        let kind = spec.kind();
        let echo = (!self.mirrors.is_empty()).then(|| spec.clone());
        self.replace(id, spec)?;
        self.revision += 1;
        debug!(%kind, %id, "object changed");
        if let Some(spec) = echo {
            self.notify(&Mutation::Change { id, spec });
        }
        Ok(())
    }

    /// Swaps the spec in place and marks the entry changed. Derived
    /// geometry is rebuilt by [`MapWorld::refresh_derived`].
    fn replace(&mut self, id: ObjectId, spec: ObjectSpec) -> StoreResult<()> {
        match spec {
            ObjectSpec::Station(s) => replace_spec(&mut self.stations, ObjectKind::Station, id, s),
            ObjectSpec::Source { spec, ellipse } => {
                if !self.sources.contains(id) {
                    return Err(StoreError::NotFound {
                        kind: ObjectKind::Source,
                        id,
                    });
                }
                self.sync_source_ellipse(id, &spec, ellipse);
                replace_spec(&mut self.sources, ObjectKind::Source, id, spec)
            }
            ObjectSpec::Arc(s) => {
                self.check_anchors(&s.anchors)?;
                replace_spec(&mut self.arcs, ObjectKind::Arc, id, s)
            }
            ObjectSpec::Delta(s) => {
                self.check_anchors(&s.anchors)?;
                replace_spec(&mut self.deltas, ObjectKind::Delta, id, s)
            }
            ObjectSpec::Ellipse(s) => replace_spec(&mut self.ellipses, ObjectKind::Ellipse, id, s),
            ObjectSpec::Line(s) => replace_spec(&mut self.lines, ObjectKind::Line, id, s),
            ObjectSpec::Polygon(s) => replace_spec(&mut self.polygons, ObjectKind::Polygon, id, s),
            ObjectSpec::Rectangle(s) => {
                replace_spec(&mut self.rectangles, ObjectKind::Rectangle, id, s)
            }
            ObjectSpec::SymbolGroup(s) => {
                replace_spec(&mut self.symbol_groups, ObjectKind::SymbolGroup, id, s)
            }
            ObjectSpec::Circle(s) => replace_spec(&mut self.circles, ObjectKind::Circle, id, s),
            ObjectSpec::Theme(s) => {
                if let ThemeVariant::Image(image) = &s.variant {
                    image.grid.validate().map_err(StoreError::MalformedGeometry)?;
                }
                replace_spec(&mut self.themes, ObjectKind::Theme, id, s)
            }
        }
    }

    fn sync_source_ellipse(&mut self, source: ObjectId, spec: &SourceSpec, eid: Option<ObjectId>) {
        let existing = self.source_ellipse(source);
        match (spec.ellipse, existing, eid) {
            (Some(axes), Some(current), _) => {
                if let Some(entry) = self.ellipses.get_mut(current) {
                    entry.spec.origin = spec.point;
                    entry.spec.axes = axes;
                    entry.spec.label = spec.label.clone();
                    entry.changed = true;
                }
            }
            (Some(axes), None, Some(new_id)) => {
                self.ids.observe(new_id);
                let mut es = EllipseSpec::new(spec.point, axes);
                es.label = spec.label.clone();
                es.owner = Some(source);
                let mut entry = Entry::new(es, Vec::new());
                entry.changed = true;
                self.ellipses.insert(new_id, entry);
                self.source_ellipses.insert(source, new_id);
            }
            (None, Some(current), _) => {
                self.ellipses.remove(current);
                self.source_ellipses.remove(&source);
            }
            _ => {}
        }
    }

    // ---- delete ----

    /// Deletes `target` and everything that depends on it. Returns every
    /// removed object, `target` first.
    pub fn delete(&mut self, target: ObjectRef) -> StoreResult<Vec<ObjectRef>> {
        let removed = self.remove_cascade(target)?;
        self.revision += 1;
        debug!(object = %target, cascaded = removed.len() - 1, "object deleted");
        if !self.mirrors.is_empty() {
            self.notify(&Mutation::Delete(target));
        }
        Ok(removed)
    }

    pub fn delete_station(&mut self, id: ObjectId) -> StoreResult<Vec<ObjectRef>> {
        self.delete(ObjectRef::station(id))
    }

    pub fn delete_source(&mut self, id: ObjectId) -> StoreResult<Vec<ObjectRef>> {
        self.delete(ObjectRef::source(id))
    }

    fn remove_cascade(&mut self, target: ObjectRef) -> StoreResult<Vec<ObjectRef>> {
        let id = target.id;
        let not_found = StoreError::NotFound {
            kind: target.kind,
            id,
        };
        let mut removed = vec![target];
        match target.kind {
            ObjectKind::Station => {
                self.stations.remove(id).ok_or(not_found)?;
                self.remove_dependents(target, &mut removed);
            }
            ObjectKind::Source => {
                self.sources.remove(id).ok_or(not_found)?;
                if let Some(eid) = self.source_ellipses.remove(&id) {
                    self.ellipses.remove(eid);
                    removed.push(ObjectRef::new(ObjectKind::Ellipse, eid));
                }
                self.remove_dependents(target, &mut removed);
            }
            ObjectKind::Ellipse => {
                let ellipse = self.ellipses.remove(id).ok_or(not_found)?;
                if let Some(owner) = ellipse.spec.owner {
                    self.source_ellipses.remove(&owner);
                    if let Some(source) = self.sources.get_mut(owner) {
                        source.spec.ellipse = None;
                    }
                }
            }
            ObjectKind::Arc => {
                self.arcs.remove(id).ok_or(not_found)?;
            }
            ObjectKind::Delta => {
                self.deltas.remove(id).ok_or(not_found)?;
            }
            ObjectKind::Line => {
                self.lines.remove(id).ok_or(not_found)?;
            }
            ObjectKind::Polygon => {
                self.polygons.remove(id).ok_or(not_found)?;
            }
            ObjectKind::Rectangle => {
                self.rectangles.remove(id).ok_or(not_found)?;
            }
            ObjectKind::SymbolGroup => {
                self.symbol_groups.remove(id).ok_or(not_found)?;
            }
            ObjectKind::Circle => {
                self.circles.remove(id).ok_or(not_found)?;
            }
            ObjectKind::Theme => {
                self.themes.remove(id).ok_or(not_found)?;
            }
        }
        Ok(removed)
    }

    fn remove_dependents(&mut self, anchor: ObjectRef, removed: &mut Vec<ObjectRef>) {
        for dep in self.dependents_of(anchor) {
            match dep.kind {
                ObjectKind::Arc => {
                    self.arcs.remove(dep.id);
                }
                _ => {
                    self.deltas.remove(dep.id);
                }
            }
            removed.push(dep);
        }
    }

    // ---- display ----

    pub fn display(&self, target: ObjectRef) -> Option<DisplayState> {
        let id = target.id;
        match target.kind {
            ObjectKind::Station => self.stations.get(id).map(|e| e.display),
            ObjectKind::Source => self.sources.get(id).map(|e| e.display),
            ObjectKind::Arc => self.arcs.get(id).map(|e| e.display),
            ObjectKind::Delta => self.deltas.get(id).map(|e| e.display),
            ObjectKind::Ellipse => self.ellipses.get(id).map(|e| e.display),
            ObjectKind::Line => self.lines.get(id).map(|e| e.display),
            ObjectKind::Polygon => self.polygons.get(id).map(|e| e.display),
            ObjectKind::Rectangle => self.rectangles.get(id).map(|e| e.display),
            ObjectKind::SymbolGroup => self.symbol_groups.get(id).map(|e| e.display),
            ObjectKind::Circle => self.circles.get(id).map(|e| e.display),
            ObjectKind::Theme => self.themes.get(id).map(|e| e.display),
        }
    }

    fn display_mut(&mut self, target: ObjectRef) -> StoreResult<&mut DisplayState> {
        let id = target.id;
        let state = match target.kind {
            ObjectKind::Station => self.stations.get_mut(id).map(|e| &mut e.display),
            ObjectKind::Source => self.sources.get_mut(id).map(|e| &mut e.display),
            ObjectKind::Arc => self.arcs.get_mut(id).map(|e| &mut e.display),
            ObjectKind::Delta => self.deltas.get_mut(id).map(|e| &mut e.display),
            ObjectKind::Ellipse => self.ellipses.get_mut(id).map(|e| &mut e.display),
            ObjectKind::Line => self.lines.get_mut(id).map(|e| &mut e.display),
            ObjectKind::Polygon => self.polygons.get_mut(id).map(|e| &mut e.display),
            ObjectKind::Rectangle => self.rectangles.get_mut(id).map(|e| &mut e.display),
            ObjectKind::SymbolGroup => self.symbol_groups.get_mut(id).map(|e| &mut e.display),
            ObjectKind::Circle => self.circles.get_mut(id).map(|e| &mut e.display),
            ObjectKind::Theme => self.themes.get_mut(id).map(|e| &mut e.display),
        };
        state.ok_or(StoreError::NotFound {
            kind: target.kind,
            id,
        })
    }

    /// Explicit per-object change; this is the only way out of a locked mode.
    pub fn set_display(&mut self, target: ObjectRef, mode: DisplayMode) -> StoreResult<()> {
        self.display_mut(target)?.mode = mode;
        self.revision += 1;
        if !self.mirrors.is_empty() {
            self.notify(&Mutation::Display { target, mode });
        }
        Ok(())
    }

    /// Sets the selected flag. A plainly shown object switches to
    /// `SelectedOn` while selected. Returns whether anything changed.
    pub fn set_selected(&mut self, target: ObjectRef, selected: bool) -> StoreResult<bool> {
        let state = self.display_mut(target)?;
        if state.selected == selected {
            return Ok(false);
        }
        state.selected = selected;
        state.mode = match (state.mode, selected) {
            (DisplayMode::On, true) => DisplayMode::SelectedOn,
            (DisplayMode::SelectedOn, false) => DisplayMode::On,
            (mode, _) => mode,
        };
        self.revision += 1;
        if !self.mirrors.is_empty() {
            self.notify(&Mutation::Select { target, selected });
        }
        Ok(true)
    }

    /// Ids of selected objects of `kind`.
    pub fn selected(&self, kind: ObjectKind) -> SelectionSet {
        let mut out = SelectionSet::new();
        for id in self.ids_of(kind) {
            if self
                .display(ObjectRef::new(kind, id))
                .is_some_and(|d| d.selected)
            {
                out.insert(id);
            }
        }
        out
    }

    pub fn ids_of(&self, kind: ObjectKind) -> Vec<ObjectId> {
        match kind {
            ObjectKind::Station => self.stations.ids(),
            ObjectKind::Source => self.sources.ids(),
            ObjectKind::Arc => self.arcs.ids(),
            ObjectKind::Delta => self.deltas.ids(),
            ObjectKind::Ellipse => self.ellipses.ids(),
            ObjectKind::Line => self.lines.ids(),
            ObjectKind::Polygon => self.polygons.ids(),
            ObjectKind::Rectangle => self.rectangles.ids(),
            ObjectKind::SymbolGroup => self.symbol_groups.ids(),
            ObjectKind::Circle => self.circles.ids(),
            ObjectKind::Theme => self.themes.ids(),
        }
    }

    /// Bulk show/hide of one category. `filter` matches a label exactly, or
    /// as a prefix when it ends in `*`. Locked objects are skipped. Returns
    /// the ids whose mode was set.
    pub fn display_by_label(
        &mut self,
        kind: ObjectKind,
        filter: Option<&str>,
        mode: DisplayMode,
    ) -> SelectionSet {
        let mut hit = SelectionSet::new();
        match kind {
            ObjectKind::Station => bulk_display(&mut self.stations, filter, mode, &mut hit),
            ObjectKind::Source => bulk_display(&mut self.sources, filter, mode, &mut hit),
            ObjectKind::Arc => bulk_display(&mut self.arcs, filter, mode, &mut hit),
            ObjectKind::Delta => bulk_display(&mut self.deltas, filter, mode, &mut hit),
            ObjectKind::Ellipse => bulk_display(&mut self.ellipses, filter, mode, &mut hit),
            ObjectKind::Line => bulk_display(&mut self.lines, filter, mode, &mut hit),
            ObjectKind::Polygon => bulk_display(&mut self.polygons, filter, mode, &mut hit),
            ObjectKind::Rectangle => bulk_display(&mut self.rectangles, filter, mode, &mut hit),
            ObjectKind::SymbolGroup => {
                bulk_display(&mut self.symbol_groups, filter, mode, &mut hit)
            }
            ObjectKind::Circle => bulk_display(&mut self.circles, filter, mode, &mut hit),
            ObjectKind::Theme => bulk_display(&mut self.themes, filter, mode, &mut hit),
        }
        self.revision += 1;
        debug!(%kind, ?filter, ?mode, affected = hit.len(), "bulk display");
        if !self.mirrors.is_empty() {
            self.notify(&Mutation::DisplayByLabel {
                kind,
                filter: filter.map(str::to_owned),
                mode,
            });
        }
        hit
    }

    /// Deletes every unlocked arc, delta, line, polygon, rectangle, symbol
    /// group and circle set.
    pub fn clear_overlays(&mut self) -> Vec<ObjectRef> {
        let mut removed = Vec::new();
        for kind in ObjectKind::OVERLAYS {
            for id in self.ids_of(kind) {
                let target = ObjectRef::new(kind, id);
                let locked = self.display(target).is_some_and(|d| d.mode.is_locked());
                if locked {
                    continue;
                }
                if let Ok(mut gone) = self.remove_cascade(target) {
                    removed.append(&mut gone);
                }
            }
        }
        self.revision += 1;
        info!(removed = removed.len(), "overlays cleared");
        if !self.mirrors.is_empty() {
            self.notify(&Mutation::ClearOverlays);
        }
        removed
    }

    // ---- themes ----

    pub fn set_theme_fill_color(&mut self, id: ObjectId, color: Option<Color>) -> StoreResult<()> {
        self.edit_theme(id, ThemeEdit::FillColor(color))
    }

    pub fn set_theme_boundary_color(
        &mut self,
        id: ObjectId,
        color: Option<Color>,
    ) -> StoreResult<()> {
        self.edit_theme(id, ThemeEdit::BoundaryColor(color))
    }

    pub fn set_theme_on_off_distance(
        &mut self,
        id: ObjectId,
        range: Option<(f64, f64)>,
    ) -> StoreResult<()> {
        self.edit_theme(id, ThemeEdit::OnOffDistance(range))
    }

    pub fn set_theme_color_scale(&mut self, id: ObjectId, scale: ColorScale) -> StoreResult<()> {
        self.edit_theme(id, ThemeEdit::ColorScale(scale))
    }

    pub fn select_theme_shape(
        &mut self,
        id: ObjectId,
        index: usize,
        selected: bool,
    ) -> StoreResult<()> {
        self.edit_theme(id, ThemeEdit::SelectShape { index, selected })
    }

    fn edit_theme(&mut self, id: ObjectId, edit: ThemeEdit) -> StoreResult<()> {
        let theme = self.themes.get_mut(id).ok_or(StoreError::NotFound {
            kind: ObjectKind::Theme,
            id,
        })?;
        apply_theme_edit(&mut theme.spec, &edit)
            .map_err(|msg| StoreError::MalformedGeometry(format!("theme {id}: {msg}")))?;
        theme.changed = true;
        self.revision += 1;
        if !self.mirrors.is_empty() {
            self.notify(&Mutation::Theme { id, edit });
        }
        Ok(())
    }

    // ---- derived geometry ----

    /// Rebuilds derived geometry for every changed entry and clears the
    /// changed flags. On failure the failing entry keeps its previous
    /// geometry and stays marked changed.
    pub fn refresh_derived(&mut self) -> StoreResult<usize> {
        let cfg = &self.config;
        let mut rebuilt = rebuild(&mut self.arcs, cfg, arc_path)?;
        rebuilt += rebuild(&mut self.deltas, cfg, delta_ring)?;
        rebuilt += rebuild(&mut self.ellipses, cfg, ellipse_ring)?;
        rebuilt += rebuild(&mut self.rectangles, cfg, rectangle_ring)?;
        clear_changed(&mut self.stations);
        clear_changed(&mut self.sources);
        clear_changed(&mut self.lines);
        clear_changed(&mut self.polygons);
        clear_changed(&mut self.symbol_groups);
        clear_changed(&mut self.circles);
        clear_changed(&mut self.themes);
        if rebuilt > 0 {
            debug!(rebuilt, "derived geometry refreshed");
        }
        Ok(rebuilt)
    }

    // ---- replication ----

    fn notify(&mut self, mutation: &Mutation) {
        for mirror in &mut self.mirrors {
            mirror.on_mutation(mutation);
        }
    }

    /// Replays a mutation produced by another store, keeping its ids.
    pub fn apply(&mut self, mutation: &Mutation) -> StoreResult<()> {
        match mutation {
            Mutation::Add { id, spec } => {
                self.ids.observe(*id);
                if let ObjectSpec::Source {
                    ellipse: Some(eid), ..
                } = spec
                {
                    self.ids.observe(*eid);
                }
                self.insert(*id, spec.clone())?;
                self.revision += 1;
                self.notify(mutation);
            }
            Mutation::Change { id, spec } => {
                if let ObjectSpec::Source {
                    ellipse: Some(eid), ..
                } = spec
                {
                    self.ids.observe(*eid);
                }
                self.change(*id, spec.clone())?;
            }
            Mutation::Delete(target) => {
                self.delete(*target)?;
            }
            Mutation::Display { target, mode } => self.set_display(*target, *mode)?,
            Mutation::Select { target, selected } => {
                self.set_selected(*target, *selected)?;
            }
            Mutation::DisplayByLabel { kind, filter, mode } => {
                self.display_by_label(*kind, filter.as_deref(), *mode);
            }
            Mutation::ClearOverlays => {
                self.clear_overlays();
            }
            Mutation::Theme { id, edit } => self.edit_theme(*id, edit.clone())?,
        }
        Ok(())
    }
}

fn replace_spec<S>(
    arena: &mut Arena<Entry<S>>,
    kind: ObjectKind,
    id: ObjectId,
    spec: S,
) -> StoreResult<()> {
    let entry = arena.get_mut(id).ok_or(StoreError::NotFound { kind, id })?;
    entry.spec = spec;
    entry.changed = true;
    Ok(())
}

fn label_matches(label: &str, filter: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(f) => match f.strip_suffix('*') {
            Some(prefix) => label.starts_with(prefix),
            None => label == f,
        },
    }
}

fn bulk_display<S: Labeled>(
    arena: &mut Arena<Entry<S>>,
    filter: Option<&str>,
    mode: DisplayMode,
    hit: &mut SelectionSet,
) {
    for (id, entry) in arena.iter_mut() {
        if entry.display.mode.is_locked() || !label_matches(entry.spec.label(), filter) {
            continue;
        }
        entry.display.mode = entry.display.mode.bulk(mode);
        hit.insert(id);
    }
}

fn rebuild<S>(
    arena: &mut Arena<Entry<S>>,
    cfg: &MaterializeConfig,
    build: impl Fn(&S, &MaterializeConfig) -> StoreResult<Vec<GeoPoint>>,
) -> StoreResult<usize> {
    let mut n = 0;
    for (_, entry) in arena.iter_mut() {
        if !entry.changed {
            continue;
        }
        entry.geometry = build(&entry.spec, cfg)?;
        entry.changed = false;
        n += 1;
    }
    Ok(n)
}

fn clear_changed<S>(arena: &mut Arena<Entry<S>>) {
    for (_, entry) in arena.iter_mut() {
        entry.changed = false;
    }
}

fn apply_theme_edit(spec: &mut ThemeSpec, edit: &ThemeEdit) -> Result<(), String> {
    match (edit, &mut spec.variant) {
        (ThemeEdit::OnOffDistance(range), _) => spec.on_off_distance = *range,
        (ThemeEdit::FillColor(color), ThemeVariant::Shape(theme)) => theme.fill = *color,
        (ThemeEdit::FillColor(_), ThemeVariant::Image(_)) => {
            return Err("image themes take their fill from the color scale".into());
        }
        (ThemeEdit::BoundaryColor(color), ThemeVariant::Shape(theme)) => theme.boundary = *color,
        (ThemeEdit::BoundaryColor(color), ThemeVariant::Image(image)) => {
            if let Some(color) = color {
                image.contour_color = *color;
            }
        }
        (ThemeEdit::ColorScale(scale), ThemeVariant::Shape(theme)) => {
            theme.color_scale = Some(scale.clone())
        }
        (ThemeEdit::ColorScale(scale), ThemeVariant::Image(image)) => {
            image.color_scale = scale.clone()
        }
        (ThemeEdit::SelectShape { index, selected }, ThemeVariant::Shape(theme)) => {
            if *index >= theme.shapes.len() {
                return Err(format!("no shape {index}"));
            }
            if *selected {
                theme.selected.insert(*index);
            } else {
                theme.selected.remove(index);
            }
        }
        (ThemeEdit::SelectShape { .. }, ThemeVariant::Image(_)) => {
            return Err("image themes have no shapes".into());
        }
    }
    Ok(())
}
