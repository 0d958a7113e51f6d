//! Replication of store mutations onto attached observers.
//!
//! Every successful mutation on a [`MapWorld`] is described by a
//! [`Mutation`] carrying the ids the primary store assigned, so a mirror
//! replaying it ends up with identical ids.

use std::cell::RefCell;
use std::rc::Rc;

use foundation::ObjectId;
use tracing::warn;

use crate::components::{
    ArcSpec, CircleSpec, Color, ColorScale, DeltaSpec, DisplayMode, EllipseSpec, LineSpec,
    PolygonSpec, RectangleSpec, SourceSpec, StationSpec, SymbolGroupSpec, ThemeSpec,
};
use crate::entity::{ObjectKind, ObjectRef};
use crate::world::MapWorld;

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectSpec {
    Station(StationSpec),
    /// `ellipse` is the id used for the source's owned ellipse, if it has one.
    Source {
        spec: SourceSpec,
        ellipse: Option<ObjectId>,
    },
    Arc(ArcSpec),
    Delta(DeltaSpec),
    Ellipse(EllipseSpec),
    Line(LineSpec),
    Polygon(PolygonSpec),
    Rectangle(RectangleSpec),
    SymbolGroup(SymbolGroupSpec),
    Circle(CircleSpec),
    Theme(ThemeSpec),
}

impl ObjectSpec {
    pub fn kind(&self) -> ObjectKind {
        match self {
            ObjectSpec::Station(_) => ObjectKind::Station,
            ObjectSpec::Source { .. } => ObjectKind::Source,
            ObjectSpec::Arc(_) => ObjectKind::Arc,
            ObjectSpec::Delta(_) => ObjectKind::Delta,
            ObjectSpec::Ellipse(_) => ObjectKind::Ellipse,
            ObjectSpec::Line(_) => ObjectKind::Line,
            ObjectSpec::Polygon(_) => ObjectKind::Polygon,
            ObjectSpec::Rectangle(_) => ObjectKind::Rectangle,
            ObjectSpec::SymbolGroup(_) => ObjectKind::SymbolGroup,
            ObjectSpec::Circle(_) => ObjectKind::Circle,
            ObjectSpec::Theme(_) => ObjectKind::Theme,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThemeEdit {
    FillColor(Option<Color>),
    BoundaryColor(Option<Color>),
    OnOffDistance(Option<(f64, f64)>),
    ColorScale(ColorScale),
    SelectShape { index: usize, selected: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Add { id: ObjectId, spec: ObjectSpec },
    Change { id: ObjectId, spec: ObjectSpec },
    Delete(ObjectRef),
    Display { target: ObjectRef, mode: DisplayMode },
    Select { target: ObjectRef, selected: bool },
    DisplayByLabel {
        kind: ObjectKind,
        filter: Option<String>,
        mode: DisplayMode,
    },
    ClearOverlays,
    Theme { id: ObjectId, edit: ThemeEdit },
}

pub trait StoreObserver {
    fn on_mutation(&mut self, mutation: &Mutation);
}

impl StoreObserver for MapWorld {
    fn on_mutation(&mut self, mutation: &Mutation) {
        if let Err(err) = self.apply(mutation) {
            warn!(%err, "mirror could not replay mutation");
        }
    }
}

/// Lets the owner keep a handle on a mirror it has attached.
impl<T: StoreObserver> StoreObserver for Rc<RefCell<T>> {
    fn on_mutation(&mut self, mutation: &Mutation) {
        self.borrow_mut().on_mutation(mutation);
    }
}

/// Records every mutation it sees.
#[derive(Debug, Default)]
pub struct MutationLog {
    pub entries: Vec<Mutation>,
}

impl StoreObserver for MutationLog {
    fn on_mutation(&mut self, mutation: &Mutation) {
        self.entries.push(mutation.clone());
    }
}
