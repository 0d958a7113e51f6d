//! `MapPlot`: one plotting surface with its store, projection, renderer
//! and pointer state.

use foundation::ObjectId;
use foundation::bounds::Aabb2;
use foundation::math::{GeoPoint, Vec2};
use layers::path::{draw_path, draw_strokes};
use layers::{MapRenderer, PixelBuffer, RenderSummary, Surface};
use projection::{Projection, ProjectionError, ProjectionKind, View};
use runtime::{EventBus, Metrics, Redisplay, Redraw, Stamped};
use scene::components::{LineStyle, SymbolStyle};
use scene::{MapWorld, ObjectKind, StoreResult};
use tracing::{debug, info};

use crate::config::MapConfig;
use crate::events::{CursorInfo, MapEvent};
use crate::interaction::{Context, Interaction, InteractionState, cursor_info};
use crate::picking::{Pick, PickMode, Picker};
use crate::polar::PolarSelection;
use crate::utm_select::{cell_outline, leave_cell};

pub struct MapPlot {
    config: MapConfig,
    world: MapWorld,
    projection: Projection,
    view: View,
    renderer: MapRenderer,
    pixels: PixelBuffer,
    events: EventBus<MapEvent>,
    redisplay: Redisplay,
    interaction: Interaction,
    cursor: Option<Vec2>,
}

impl MapPlot {
    pub fn new(config: MapConfig) -> Result<Self, ProjectionError> {
        let projection = Projection::from_params(&config.projection)?;
        let view = View::fit(projection.plane_extent(), config.width, config.height);
        let mut redisplay = Redisplay::new();
        redisplay.request(Redraw::Full);
        Ok(Self {
            world: MapWorld::with_config(config.materialize.clone()),
            renderer: MapRenderer::new(config.style.clone()),
            pixels: PixelBuffer::new(view.width(), view.height()),
            projection,
            view,
            events: EventBus::new(),
            redisplay,
            interaction: Interaction::new(),
            cursor: None,
            config,
        })
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn world(&self) -> &MapWorld {
        &self.world
    }

    /// Mutable store access; the next render redraws everything.
    pub fn world_mut(&mut self) -> &mut MapWorld {
        self.world_mut_with(true)
    }

    /// Store access with the redraw request left to the caller when
    /// `redisplay` is false. A batch of edits ends with
    /// [`MapPlot::request_redraw`].
    pub fn world_mut_with(&mut self, redisplay: bool) -> &mut MapWorld {
        if redisplay {
            self.redisplay.request(Redraw::Full);
        }
        &mut self.world
    }

    pub fn request_redraw(&mut self, level: Redraw) {
        self.redisplay.request(level);
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    fn refit(&mut self) {
        self.view = View::fit(self.projection.plane_extent(), self.view.width(), self.view.height());
        self.redisplay.request(Redraw::Full);
    }

    /// Switches projection and shows its whole plane.
    pub fn set_projection(&mut self, kind: ProjectionKind) {
        self.projection.set_kind(kind);
        self.refit();
    }

    pub fn set_rotation(&mut self, pole_lon: f64, pole_lat: f64) {
        self.projection.set_rotation(pole_lon, pole_lat);
        self.refit();
    }

    /// Re-centres the projection on the point under `(x, y)`, keeping the
    /// window size. Returns `false` off the map.
    pub fn rotate_to_cursor(&mut self, x: f64, y: f64) -> bool {
        let plane = self.view.to_plane(x, y);
        let Some(target) = self.projection.unproject(plane.x, plane.y) else {
            return false;
        };
        self.projection.recenter(target);
        let q = self.projection.project(target);
        let w = self.view.window();
        let (hw, hh) = (0.5 * w.width(), 0.5 * w.height());
        self.view
            .set_window(Aabb2::new([q.x - hw, q.y - hh], [q.x + hw, q.y + hh]));
        self.redisplay.request(Redraw::Full);
        true
    }

    /// Zooms about device point `(x, y)`; `factor > 1` zooms in.
    pub fn zoom(&mut self, factor: f64, x: f64, y: f64) {
        self.view.zoom(factor, Vec2::new(x, y));
        self.redisplay.request(Redraw::Full);
    }

    pub fn set_window(&mut self, window: Aabb2) {
        self.view.set_window(window);
        self.redisplay.request(Redraw::Full);
    }

    /// New device size; the pixel buffer is reallocated.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.view = View::fit(self.view.window(), width, height);
        self.pixels.resize(self.view.width(), self.view.height());
        self.redisplay.request(Redraw::Full);
        debug!(width, height, "plot resized");
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn redisplay_pending(&self) -> Redraw {
        self.redisplay.pending()
    }

    /// Draws into the plot's own pixel buffer.
    pub fn render(&mut self) -> StoreResult<RenderSummary> {
        let mut pixels = std::mem::replace(&mut self.pixels, PixelBuffer::new(0, 0));
        let summary = self.render_to(&mut pixels);
        self.pixels = pixels;
        summary
    }

    /// Draws whatever the pending redraw level covers onto `surface`, then
    /// the cursor layer. With nothing pending the surface is left alone.
    pub fn render_to(&mut self, surface: &mut dyn Surface) -> StoreResult<RenderSummary> {
        self.world.refresh_derived()?;
        let level = self.redisplay.take();
        if level == Redraw::None {
            return Ok(RenderSummary::default());
        }
        let summary = self
            .renderer
            .redraw(level, &self.world, &self.projection, &self.view, surface);
        self.draw_cursor_layer(surface);
        Ok(summary)
    }

    /// Drag preview, UTM cell hover, polar wedge and crosshair.
    fn draw_cursor_layer(&self, surface: &mut dyn Surface) {
        let highlight = self.renderer.style().highlight;
        let line = LineStyle {
            color: highlight,
            width_px: 1,
        };
        match self.interaction.state() {
            InteractionState::DraggingPoint {
                target,
                at: Some(at),
                ..
            } => {
                if let Some(style) = self.symbol_of(target.kind, target.id)
                    && let Some(d) = self.device(*at)
                {
                    surface.symbol(d, &style);
                }
            }
            InteractionState::SelectingUtmCell { hover: Some(cell) } => {
                draw_path(surface, &cell_outline(*cell, 1.0), false, &self.projection, &self.view, line);
            }
            _ => {}
        }
        if self.projection.kind() == ProjectionKind::Polar
            && let Some(sel) = self.interaction.polar_selection()
        {
            let ring: Vec<Vec2> = sel
                .outline(2.0)
                .into_iter()
                .map(|p| self.view.to_device(p.x, p.y))
                .collect();
            draw_strokes(surface, &[ring], line);
        }
        if self.config.crosshair
            && let Some(c) = self.cursor
        {
            let (w, h) = (f64::from(surface.width()), f64::from(surface.height()));
            surface.stroke(Vec2::new(0.0, c.y), Vec2::new(w, c.y), line);
            surface.stroke(Vec2::new(c.x, 0.0), Vec2::new(c.x, h), line);
        }
    }

    fn symbol_of(&self, kind: ObjectKind, id: ObjectId) -> Option<SymbolStyle> {
        match kind {
            ObjectKind::Station => self.world.station(id).map(|s| s.spec.symbol),
            ObjectKind::Source => self.world.source(id).map(|s| s.spec.symbol),
            _ => None,
        }
    }

    fn device(&self, p: GeoPoint) -> Option<Vec2> {
        let q = self.projection.project(p);
        q.visible.then(|| self.view.to_device(q.x, q.y))
    }

    pub fn pick(&mut self, x: f64, y: f64, mode: PickMode) -> StoreResult<Option<Pick>> {
        self.world.refresh_derived()?;
        Ok(Picker::new(&self.world, &self.projection, &self.view, self.config.picking)
            .with_polar_selection(self.interaction.polar_selection())
            .pick(x, y, mode))
    }

    pub fn cursor_info(&self, x: f64, y: f64) -> CursorInfo {
        cursor_info(&self.world, &self.projection, &self.view, x, y)
    }

    fn with_context<R>(&mut self, f: impl FnOnce(&mut Interaction, &mut Context<'_>) -> R) -> R {
        let mut ctx = Context {
            world: &mut self.world,
            projection: &mut self.projection,
            view: &mut self.view,
            events: &mut self.events,
            redisplay: &mut self.redisplay,
            frame: self.renderer.frame(),
            config: &self.config,
        };
        f(&mut self.interaction, &mut ctx)
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> StoreResult<()> {
        self.world.refresh_derived()?;
        self.with_context(|ix, ctx| ix.pointer_down(ctx, x, y))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> StoreResult<CursorInfo> {
        self.cursor = Some(Vec2::new(x, y));
        self.with_context(|ix, ctx| ix.pointer_move(ctx, x, y))
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> StoreResult<()> {
        self.with_context(|ix, ctx| ix.pointer_up(ctx, x, y))
    }

    /// Abandons a drag or an unfinished measurement.
    pub fn cancel_gesture(&mut self) -> StoreResult<()> {
        self.with_context(|ix, ctx| ix.cancel(ctx))
    }

    /// The next pointer-down picks a UTM cell to enter.
    pub fn begin_utm_selection(&mut self) {
        if self.projection.kind() != ProjectionKind::Utm {
            self.set_projection(ProjectionKind::Utm);
        }
        self.interaction.begin_utm_selection();
        info!("utm cell selection started");
    }

    /// Back from UTM-near to the flat UTM display.
    pub fn leave_utm_cell(&mut self) {
        if self.projection.kind() == ProjectionKind::UtmNear {
            leave_cell(&mut self.projection, &mut self.view);
            self.redisplay.request(Redraw::Full);
        }
    }

    pub fn set_polar_selection(&mut self, selection: Option<PolarSelection>) {
        self.interaction.set_polar_selection(selection);
        self.redisplay.request(Redraw::Overlays);
    }

    pub fn polar_selection(&self) -> Option<&PolarSelection> {
        self.interaction.polar_selection()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&MapEvent) + 'static) {
        self.events.subscribe(listener);
    }

    pub fn events(&self) -> &[Stamped<MapEvent>] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<Stamped<MapEvent>> {
        self.events.drain()
    }

    pub fn metrics(&self) -> &Metrics {
        self.renderer.metrics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene::components::{Shape, ShapeKind, ShapeTheme, StationSpec, ThemeSpec, ThemeVariant, colors};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn default_plot_fits_the_world() {
        let mut plot = MapPlot::new(MapConfig::default()).unwrap();
        let w = plot.view().window();
        assert_close(w.min[0], -180.0, 1e-9);
        assert_close(w.max[1], 90.0, 1e-9);
        assert_eq!(plot.redisplay_pending(), Redraw::Full);
        let summary = plot.render().unwrap();
        assert!(summary.spans > 0);
        assert_eq!(plot.redisplay_pending(), Redraw::None);
        assert_eq!(plot.pixels().pixel(0, 0).map(|p| p[3]), Some(255));
        assert_eq!(plot.metrics().counter("render.passes"), 1);
    }

    #[test]
    fn store_edits_request_a_full_redraw() {
        let mut plot = MapPlot::new(MapConfig::default()).unwrap();
        plot.render().unwrap();
        plot.world_mut()
            .add_station(StationSpec::new("ST", GeoPoint::new(0.0, 0.0)))
            .unwrap();
        assert_eq!(plot.redisplay_pending(), Redraw::Full);
    }

    #[test]
    fn deferred_edits_wait_for_an_explicit_request() {
        let mut plot = MapPlot::new(MapConfig::default()).unwrap();
        plot.render().unwrap();
        for lon in [0.0, 10.0, 20.0] {
            plot.world_mut_with(false)
                .add_station(StationSpec::new("ST", GeoPoint::new(0.0, lon)))
                .unwrap();
        }
        assert_eq!(plot.redisplay_pending(), Redraw::None);
        assert_eq!(plot.render().unwrap(), RenderSummary::default());

        plot.request_redraw(Redraw::Full);
        assert_eq!(plot.render().unwrap().symbols, 3);
    }

    #[test]
    fn each_redraw_level_repaints_only_its_layers() {
        let mut config = MapConfig::default();
        config.crosshair = true;
        let mut plot = MapPlot::new(config).unwrap();
        let ring = vec![
            GeoPoint::new(-20.0, -20.0),
            GeoPoint::new(-20.0, 20.0),
            GeoPoint::new(20.0, 20.0),
            GeoPoint::new(20.0, -20.0),
        ];
        let mut theme = ShapeTheme::new(ShapeKind::Polygon, vec![Shape::polygon(vec![ring])]);
        theme.fill = Some(colors::LAND);
        let t = plot
            .world_mut()
            .add_theme(ThemeSpec::shapes("land", theme))
            .unwrap();

        let full = plot.render().unwrap();
        assert!(full.spans > 0);
        assert_eq!(full.replayed, 0);
        let image = plot.pixels().clone();

        // Clicking the shape toggles its selection: overlays only.
        plot.pointer_down(360.0, 180.0).unwrap();
        plot.pointer_up(360.0, 180.0).unwrap();
        assert_eq!(plot.redisplay_pending(), Redraw::Overlays);
        let selected = plot.render().unwrap();
        assert_eq!(selected.spans, 0);
        assert!(selected.segments > 0);
        assert!(selected.replayed > 0);
        let ThemeVariant::Shape(shapes) = &plot.world().theme(t).unwrap().spec.variant else {
            panic!("expected shape theme");
        };
        assert!(shapes.selected.contains(&0));

        plot.pointer_down(360.0, 180.0).unwrap();
        plot.pointer_up(360.0, 180.0).unwrap();
        plot.render().unwrap();
        assert!(plot.pixels() == &image);

        // Nothing pending: nothing drawn.
        assert_eq!(plot.render().unwrap(), RenderSummary::default());
        assert_eq!(plot.metrics().counter("render.passes"), 3);

        plot.pointer_move(10.0, 20.0).unwrap();
        assert_eq!(plot.redisplay_pending(), Redraw::Cursor);
        let cursor = plot.render().unwrap();
        assert_eq!((cursor.spans, cursor.segments, cursor.symbols), (0, 0, 0));
        assert!(cursor.replayed >= selected.replayed);
        assert_eq!(plot.pixels().pixel(200, 20), Some([255, 0, 0, 255]));
        assert_eq!(plot.metrics().counter("render.passes.cursor"), 1);
    }

    #[test]
    fn rotate_to_cursor_centres_the_point() {
        let mut plot = MapPlot::new(MapConfig::default()).unwrap();
        // Device (540, 90) on a 720x360 world view is (45N, 90E).
        assert!(plot.rotate_to_cursor(540.0, 90.0));
        assert_close(plot.projection().lon_center(), 90.0, 1e-9);
        let c = plot.view().window().center();
        assert_close(c.x, 90.0, 1e-9);
        assert_close(c.y, 45.0, 1e-9);
        assert_close(plot.view().window().width(), 360.0, 1e-9);
    }

    #[test]
    fn resize_reallocates_pixels() {
        let mut plot = MapPlot::new(MapConfig::default()).unwrap();
        plot.resize(200, 100);
        assert_eq!(plot.pixels().pixel(199, 99), Some([0, 0, 0, 0]));
        assert_eq!(plot.pixels().pixel(200, 0), None);
        assert_eq!(plot.view().width(), 200);
    }
}
