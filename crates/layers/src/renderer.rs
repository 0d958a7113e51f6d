//! Draw pass over the whole object store.
//!
//! Two cached layers, back to front. The base layer holds the globe, themes
//! and reference grids. The overlay layer holds theme selection outlines,
//! filled overlays, line overlays, circles, symbol groups, sources and
//! stations with their tags, then the horizon outline. A redraw below
//! [`Redraw::Full`] replays the cached base instead of rebuilding it.

use foundation::math::{GeoPoint, Vec2};
use projection::{Projection, ProjectionKind, View};
use runtime::{Frame, Metrics, Redraw};
use scene::MapWorld;
use scene::components::{
    Color, ImageTheme, LineStyle, ShapeKind, ShapeTheme, SymbolStyle, TagPosition, ThemeVariant,
    colors,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::canvas::{DisplayList, Span, Surface};
use crate::contour::contour_levels;
use crate::graticule::{graticule_lines, horizon_outline, utm_grid_lines};
use crate::labels::{TagRequest, TagStyle, layout_tags};
use crate::path::{draw_path, draw_strokes};
use crate::raster::shade_image;
use crate::scanline::{FillOutcome, fill_shape};
use crate::symbology::highlighted;

/// Sample spacing of generated reference lines, in degrees.
const GRID_STEP_DEG: f64 = 2.0;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraticuleStyle {
    pub spacing_deg: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    pub background: Color,
    /// Fill of the projected world (the disk for azimuthal projections).
    pub globe: Option<Color>,
    pub graticule: Option<GraticuleStyle>,
    pub horizon: Option<Color>,
    /// UTM zone/band lines, drawn in UTM flat mode only.
    pub utm_grid: Option<Color>,
    pub highlight: Color,
    pub tags: TagStyle,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: colors::WHITE,
            globe: Some(colors::OCEAN),
            graticule: Some(GraticuleStyle {
                spacing_deg: 30.0,
                color: colors::GRAY,
            }),
            horizon: Some(colors::BLACK),
            utm_grid: Some(colors::GRAY),
            highlight: colors::RED,
            tags: TagStyle::default(),
        }
    }
}

/// Totals of one draw pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RenderSummary {
    pub spans: u64,
    pub segments: u64,
    pub symbols: u64,
    pub tags: u64,
    pub shapes_skipped: u64,
    pub shapes_reversed: u64,
    pub pixels_shaded: u64,
    /// Primitives copied from a cached layer rather than rebuilt.
    pub replayed: u64,
}

impl std::ops::AddAssign for RenderSummary {
    fn add_assign(&mut self, o: Self) {
        self.spans += o.spans;
        self.segments += o.segments;
        self.symbols += o.symbols;
        self.tags += o.tags;
        self.shapes_skipped += o.shapes_skipped;
        self.shapes_reversed += o.shapes_reversed;
        self.pixels_shaded += o.pixels_shaded;
        self.replayed += o.replayed;
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapRenderer {
    style: RenderStyle,
    metrics: Metrics,
    frame: Frame,
    base: DisplayList,
    overlays: DisplayList,
    cached: bool,
}

impl MapRenderer {
    pub fn new(style: RenderStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Counters accumulated over every pass so far.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Frame of the next pass.
    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Full redraw of every layer.
    pub fn render(
        &mut self,
        world: &MapWorld,
        projection: &Projection,
        view: &View,
        surface: &mut dyn Surface,
    ) -> RenderSummary {
        self.redraw(Redraw::Full, world, projection, view, surface)
    }

    /// Rebuilds the layers `level` covers, replays the cached rest onto
    /// `surface`. Nothing is drawn for [`Redraw::None`]. A missing cache or
    /// a new surface size forces a full pass.
    pub fn redraw(
        &mut self,
        level: Redraw,
        world: &MapWorld,
        projection: &Projection,
        view: &View,
        surface: &mut dyn Surface,
    ) -> RenderSummary {
        if level == Redraw::None {
            return RenderSummary::default();
        }
        let (width, height) = (surface.width(), surface.height());
        let level = if !self.cached || self.base.width() != width || self.base.height() != height {
            Redraw::Full
        } else {
            level
        };

        let mut summary = RenderSummary::default();
        if level == Redraw::Full {
            self.base = DisplayList::new(width, height);
            let mut pass = Pass::new(&self.style, projection, view, &mut self.base);
            pass.base_layer(world);
            summary += pass.summary;
        }
        if level >= Redraw::Overlays {
            self.overlays = DisplayList::new(width, height);
            let mut pass = Pass::new(&self.style, projection, view, &mut self.overlays);
            pass.overlay_layer(world);
            summary += pass.summary;
        }
        self.cached = true;

        let base = self.base.replay(surface) as u64;
        let overlays = self.overlays.replay(surface) as u64;
        summary.replayed = match level {
            Redraw::Full => 0,
            Redraw::Overlays => base,
            _ => base + overlays,
        };

        self.record(level, summary);
        debug!(
            frame = self.frame.index,
            ?level,
            kind = %projection.kind(),
            spans = summary.spans,
            segments = summary.segments,
            replayed = summary.replayed,
            skipped = summary.shapes_skipped,
            "render pass"
        );
        self.frame = self.frame.next();
        summary
    }

    fn record(&mut self, level: Redraw, s: RenderSummary) {
        let m = &mut self.metrics;
        m.inc_counter("render.passes", 1);
        let name = match level {
            Redraw::Full => "render.passes.full",
            Redraw::Overlays => "render.passes.overlays",
            _ => "render.passes.cursor",
        };
        m.inc_counter(name, 1);
        m.inc_counter("render.spans", s.spans);
        m.inc_counter("render.segments", s.segments);
        m.inc_counter("render.symbols", s.symbols);
        m.inc_counter("render.tags", s.tags);
        m.inc_counter("render.shapes_skipped", s.shapes_skipped);
        m.inc_counter("render.shapes_reversed", s.shapes_reversed);
        m.inc_counter("render.pixels_shaded", s.pixels_shaded);
        m.inc_counter("render.replayed", s.replayed);
        m.set_gauge("render.frame", self.frame.index as i64);
        m.record("render.spans_per_pass", s.spans as i64);
    }
}

struct Pass<'a> {
    style: &'a RenderStyle,
    projection: &'a Projection,
    view: &'a View,
    surface: &'a mut dyn Surface,
    summary: RenderSummary,
}

impl<'a> Pass<'a> {
    fn new(style: &'a RenderStyle, projection: &'a Projection, view: &'a View, surface: &'a mut dyn Surface) -> Self {
        Self {
            style,
            projection,
            view,
            surface,
            summary: RenderSummary::default(),
        }
    }

    fn base_layer(&mut self, world: &MapWorld) {
        self.surface.clear(self.style.background);
        self.globe();
        self.themes(world);
        self.reference_grids();
    }

    fn overlay_layer(&mut self, world: &MapWorld) {
        self.theme_highlights(world);
        self.filled_overlays(world);
        self.line_overlays(world);
        self.circles(world);
        self.symbol_groups(world);
        self.points_and_tags(world);
        self.horizon();
    }

    fn line(color: Color, width_px: u32) -> LineStyle {
        LineStyle { color, width_px }
    }

    fn path(&mut self, points: &[GeoPoint], closed: bool, style: LineStyle) {
        let n = draw_path(self.surface, points, closed, self.projection, self.view, style);
        self.summary.segments += n as u64;
    }

    fn span(&mut self, span: Span, color: Color) {
        self.surface.fill_span(span, color);
        self.summary.spans += 1;
    }

    fn fill(&mut self, parts: &[Vec<GeoPoint>], color: Color, what: &str) {
        let fill = fill_shape(parts, self.projection, self.view);
        match fill.outcome {
            FillOutcome::Skipped => {
                warn!(shape = what, "ring wound backward after reversal; fill skipped");
                self.summary.shapes_skipped += 1;
            }
            FillOutcome::Reversed => self.summary.shapes_reversed += 1,
            FillOutcome::Empty | FillOutcome::Filled => {}
        }
        for span in fill.spans {
            self.span(span, color);
        }
    }

    fn device(&self, p: GeoPoint) -> Option<Vec2> {
        let q = self.projection.project(p);
        (q.visible && q.x.is_finite() && q.y.is_finite()).then(|| self.view.to_device(q.x, q.y))
    }

    fn symbol(&mut self, p: GeoPoint, style: &SymbolStyle) -> Option<Vec2> {
        let at = self.device(p)?;
        self.surface.symbol(at, style);
        self.summary.symbols += 1;
        Some(at)
    }

    fn globe(&mut self) {
        let Some(color) = self.style.globe else {
            return;
        };
        let view = *self.view;
        if self.projection.is_cylindrical() {
            let extent = self.projection.plane_extent();
            let (x0, x1) = (view.to_device(extent.min[0], 0.0).x, view.to_device(extent.max[0], 0.0).x);
            let c0 = (x0 - 0.5).ceil().max(0.0);
            let c1 = (x1 - 0.5).floor().min(f64::from(view.width() - 1));
            if c0 > c1 {
                return;
            }
            for row in 0..view.height() {
                let y = view.row_plane_y(row);
                if y.abs() < extent.max[1] {
                    self.span(Span::new(row, c0 as u32, c1 as u32), color);
                }
            }
        } else if let Some(r) = self.projection.limit_radius() {
            for row in 0..view.height() {
                let y = view.row_plane_y(row);
                if y.abs() >= r {
                    continue;
                }
                let hw = (r * r - y * y).sqrt();
                let c0 = (view.to_device(-hw, y).x - 0.5).ceil().max(0.0);
                let c1 = (view.to_device(hw, y).x - 0.5).floor().min(f64::from(view.width() - 1));
                if c0 <= c1 {
                    self.span(Span::new(row, c0 as u32, c1 as u32), color);
                }
            }
        }
    }

    fn themes(&mut self, world: &MapWorld) {
        let width = self.view.window().width();
        for (_, theme) in world.themes().iter() {
            if !theme.is_visible() || !theme.spec.shown_at(width) {
                continue;
            }
            match &theme.spec.variant {
                ThemeVariant::Shape(shapes) => self.shape_theme(&theme.spec.name, shapes),
                ThemeVariant::Image(image) => self.image_theme(image),
            }
        }
    }

    fn shape_theme(&mut self, name: &str, theme: &ShapeTheme) {
        for (index, shape) in theme.shapes.iter().enumerate() {
            match theme.kind {
                ShapeKind::Polygon => {
                    if shape.kind != ShapeKind::Polygon {
                        warn!(theme = name, index, "shape kind does not match polygon theme; fill skipped");
                        self.summary.shapes_skipped += 1;
                    } else if let Some(color) = theme.fill_for(shape) {
                        self.fill(&shape.parts, color, name);
                    }
                    if let Some(color) = theme.boundary {
                        for part in &shape.parts {
                            self.path(part, true, Self::line(color, 1));
                        }
                    }
                }
                ShapeKind::Polyline => {
                    let style = Self::line(theme.boundary.unwrap_or(colors::BLACK), 1);
                    for part in &shape.parts {
                        self.path(part, false, style);
                    }
                }
                ShapeKind::Point => {
                    let mut style = theme.symbol;
                    if let Some(fill) = theme.fill_for(shape) {
                        style.fill = Some(fill);
                    }
                    for p in shape.parts.iter().flatten() {
                        self.symbol(*p, &style);
                    }
                }
            }
        }
    }

    /// Selected theme shapes, drawn over the cached base.
    fn theme_highlights(&mut self, world: &MapWorld) {
        let width = self.view.window().width();
        let highlight = self.style.highlight;
        for (_, theme) in world.themes().iter() {
            if !theme.is_visible() || !theme.spec.shown_at(width) {
                continue;
            }
            let ThemeVariant::Shape(shapes) = &theme.spec.variant else {
                continue;
            };
            for shape in shapes.selected.iter().filter_map(|&i| shapes.shapes.get(i)) {
                match shapes.kind {
                    ShapeKind::Polygon | ShapeKind::Polyline => {
                        let closed = shapes.kind == ShapeKind::Polygon;
                        for part in &shape.parts {
                            self.path(part, closed, Self::line(highlight, 2));
                        }
                    }
                    ShapeKind::Point => {
                        let mut style = shapes.symbol;
                        if let Some(fill) = shapes.fill_for(shape) {
                            style.fill = Some(fill);
                        }
                        let style = highlighted(&style, highlight);
                        for p in shape.parts.iter().flatten() {
                            self.symbol(*p, &style);
                        }
                    }
                }
            }
        }
    }

    fn image_theme(&mut self, theme: &ImageTheme) {
        for (span, color) in shade_image(theme, self.projection, self.view) {
            self.summary.pixels_shaded += u64::from(span.len());
            self.span(span, color);
        }
        if theme.contour_levels.is_empty() {
            return;
        }
        let style = Self::line(theme.contour_color, 1);
        for level in contour_levels(&theme.grid, &theme.contour_levels) {
            for segment in &level.segments {
                self.path(segment, false, style);
            }
            if let Some(at) = level.label_at.and_then(|p| self.device(p)) {
                self.surface.text(at, &level.label(), theme.contour_color);
            }
        }
    }

    fn reference_grids(&mut self) {
        if let Some(g) = self.style.graticule {
            let style = Self::line(g.color, 1);
            for line in graticule_lines(g.spacing_deg, GRID_STEP_DEG) {
                self.path(&line, false, style);
            }
        }
        if let Some(color) = self.style.utm_grid
            && self.projection.kind() == ProjectionKind::Utm
        {
            let style = Self::line(color, 1);
            for line in utm_grid_lines(GRID_STEP_DEG) {
                self.path(&line, false, style);
            }
        }
    }

    fn filled_overlays(&mut self, world: &MapWorld) {
        for (id, polygon) in world.polygons().iter() {
            if !polygon.is_visible() {
                continue;
            }
            let ring = std::slice::from_ref(&polygon.spec.ring);
            if let Some(color) = polygon.spec.fill.fill {
                self.fill(ring, color, &format!("polygon#{id}"));
            }
            if let Some(color) = polygon.spec.fill.boundary {
                self.path(&polygon.spec.ring, true, Self::line(color, 1));
            }
        }
        for (id, rect) in world.rectangles().iter() {
            if !rect.is_visible() {
                continue;
            }
            let ring = std::slice::from_ref(&rect.geometry);
            if let Some(color) = rect.spec.fill.fill {
                self.fill(ring, color, &format!("rectangle#{id}"));
            }
            if let Some(color) = rect.spec.fill.boundary {
                self.path(&rect.geometry, true, Self::line(color, 1));
            }
        }
    }

    fn line_overlays(&mut self, world: &MapWorld) {
        for (_, line) in world.lines().iter() {
            if line.is_visible() {
                self.path(&line.spec.points, false, line.spec.style);
            }
        }
        for (_, ellipse) in world.ellipses().iter() {
            if ellipse.is_visible() {
                self.path(&ellipse.geometry, false, ellipse.spec.style);
            }
        }
        for (_, delta) in world.deltas().iter() {
            if delta.is_visible() {
                self.path(&delta.geometry, false, delta.spec.style);
            }
        }
        for (_, arc) in world.arcs().iter() {
            if arc.is_visible() {
                let mut style = arc.spec.style;
                if arc.display.selected {
                    style = Self::line(self.style.highlight, style.width_px.max(2));
                }
                self.path(&arc.geometry, false, style);
            }
        }
    }

    fn circles(&mut self, world: &MapWorld) {
        for (_, set) in world.circles().iter() {
            if !set.is_visible() {
                continue;
            }
            for marker in &set.spec.circles {
                if let Some(at) = self.device(marker.center) {
                    self.surface.circle(at, marker.radius_px, set.spec.style);
                    self.summary.segments += 1;
                }
            }
        }
    }

    fn symbol_groups(&mut self, world: &MapWorld) {
        for (_, group) in world.symbol_groups().iter() {
            if !group.is_visible() {
                continue;
            }
            for s in &group.spec.symbols {
                let style = if group.display.selected {
                    highlighted(&s.style, self.style.highlight)
                } else {
                    s.style
                };
                self.symbol(s.point, &style);
            }
        }
    }

    fn points_and_tags(&mut self, world: &MapWorld) {
        let mut requests = Vec::new();
        for (_, source) in world.sources().iter() {
            if source.is_visible() {
                let s = &source.spec;
                let style = self.point_style(&s.symbol, source.display.selected);
                self.tagged_symbol(s.point, &style, &s.label, s.tag, &mut requests);
            }
        }
        for (_, station) in world.stations().iter() {
            if station.is_visible() {
                let s = &station.spec;
                let style = self.point_style(&s.symbol, station.display.selected);
                self.tagged_symbol(s.point, &style, &s.label, s.tag, &mut requests);
            }
        }

        let viewport = [f64::from(self.view.width()), f64::from(self.view.height())];
        let tags = self.style.tags;
        for tag in layout_tags(&requests, viewport, &tags) {
            self.surface.text(tag.at, &tag.text, tags.color);
            self.summary.tags += 1;
        }
    }

    fn point_style(&self, style: &SymbolStyle, selected: bool) -> SymbolStyle {
        if selected {
            highlighted(style, self.style.highlight)
        } else {
            *style
        }
    }

    fn tagged_symbol(
        &mut self,
        p: GeoPoint,
        style: &SymbolStyle,
        label: &str,
        tag: TagPosition,
        requests: &mut Vec<TagRequest>,
    ) {
        if let Some(anchor) = self.symbol(p, style)
            && tag != TagPosition::Hidden
        {
            requests.push(TagRequest {
                text: label.to_owned(),
                anchor,
                position: tag,
                clearance_px: style.size_px,
            });
        }
    }

    fn horizon(&mut self) {
        let Some(color) = self.style.horizon else {
            return;
        };
        let Some(ring) = horizon_outline(self.projection, 180) else {
            return;
        };
        let device: Vec<Vec2> = ring.iter().map(|p| self.view.to_device(p.x, p.y)).collect();
        let n = draw_strokes(self.surface, &[device], Self::line(color, 1));
        self.summary.segments += n as u64;
    }
}
