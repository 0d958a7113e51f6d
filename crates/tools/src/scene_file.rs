//! JSON scene description read by the `mapplot` command line tool.
//!
//! A scene file carries an optional [`MapConfig`] plus lists of objects.
//! Points are written as `{ "lat": .., "lon": .. }`; arcs and deltas may
//! hang off a station or source by naming its label in `anchor`.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use foundation::math::GeoPoint;
use mapplot::MapConfig;
use scene::components::{
    ArcKind, ArcSpec, Color, ColorScale, DeltaSpec, EllipseAxes, FillStyle, ImageTheme, LineSpec,
    LineStyle, PolygonSpec, Shape, ShapeKind, ShapeTheme, SourceSpec, StationSpec, SymbolStyle,
    TagPosition, ThemeSpec, colors,
};
use scene::components::ScalarGrid;
use scene::{MapWorld, ObjectRef, StoreError};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneFileError {
    Io(String),
    Parse(String),
    Invalid(String),
    Store(StoreError),
}

impl fmt::Display for SceneFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneFileError::Io(msg) => write!(f, "scene read failed: {msg}"),
            SceneFileError::Parse(msg) => write!(f, "scene invalid: {msg}"),
            SceneFileError::Invalid(msg) => write!(f, "scene rejected: {msg}"),
            SceneFileError::Store(e) => write!(f, "scene object rejected: {e}"),
        }
    }
}

impl std::error::Error for SceneFileError {}

impl From<StoreError> for SceneFileError {
    fn from(e: StoreError) -> Self {
        SceneFileError::Store(e)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl From<LatLon> for GeoPoint {
    fn from(p: LatLon) -> Self {
        GeoPoint::new(p.lat, p.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationEntry {
    pub label: String,
    pub at: LatLon,
    #[serde(default)]
    pub tag: TagPosition,
    #[serde(default)]
    pub symbol: SymbolStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub label: String,
    pub at: LatLon,
    #[serde(default)]
    pub depth_km: f64,
    #[serde(default)]
    pub ellipse: Option<EllipseAxes>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcEntry {
    pub from: LatLon,
    pub to: LatLon,
    #[serde(default)]
    pub kind: ArcKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub style: LineStyle,
    #[serde(default)]
    pub anchor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaEntry {
    pub origin: LatLon,
    pub radius_deg: f64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub style: LineStyle,
    #[serde(default)]
    pub anchor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineEntry {
    pub points: Vec<LatLon>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub style: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonEntry {
    pub ring: Vec<LatLon>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub fill: FillStyle,
}

/// Evenly stepped color ramp, expanded with [`ColorScale::ramp`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RampEntry {
    pub min: f64,
    pub max: f64,
    pub steps: usize,
    pub low: Color,
    pub high: Color,
}

impl RampEntry {
    fn to_scale(self) -> Result<ColorScale, SceneFileError> {
        ColorScale::ramp(self.min, self.max, self.steps, self.low, self.high).ok_or_else(|| {
            SceneFileError::Invalid(format!(
                "color ramp needs min < max and at least 2 steps (got {}..{} in {})",
                self.min, self.max, self.steps
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeEntry {
    /// Defaults to the theme's kind.
    #[serde(default)]
    pub kind: Option<ShapeKind>,
    pub parts: Vec<Vec<LatLon>>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
}

fn default_boundary() -> Option<Color> {
    Some(colors::BLACK)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeThemeEntry {
    pub name: String,
    pub kind: ShapeKind,
    pub shapes: Vec<ShapeEntry>,
    #[serde(default)]
    pub fill: Option<Color>,
    #[serde(default = "default_boundary")]
    pub boundary: Option<Color>,
    #[serde(default)]
    pub ramp: Option<RampEntry>,
    #[serde(default)]
    pub on_off_distance: Option<(f64, f64)>,
}

fn default_shade() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageThemeEntry {
    pub name: String,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    /// Row-major, one row per latitude.
    pub values: Vec<f64>,
    #[serde(default)]
    pub no_data: Option<f64>,
    pub ramp: RampEntry,
    #[serde(default = "default_shade")]
    pub shade: bool,
    #[serde(default)]
    pub contour_levels: Vec<f64>,
    #[serde(default)]
    pub on_off_distance: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    pub config: MapConfig,
    pub stations: Vec<StationEntry>,
    pub sources: Vec<SourceEntry>,
    pub arcs: Vec<ArcEntry>,
    pub deltas: Vec<DeltaEntry>,
    pub lines: Vec<LineEntry>,
    pub polygons: Vec<PolygonEntry>,
    pub shape_themes: Vec<ShapeThemeEntry>,
    pub image_themes: Vec<ImageThemeEntry>,
}

impl SceneFile {
    pub fn from_json_str(raw: &str) -> Result<Self, SceneFileError> {
        serde_json::from_str(raw).map_err(|e| SceneFileError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, SceneFileError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SceneFileError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    /// Adds every object to `world`, themes first so symbols stay on top.
    /// Returns the number of objects added.
    pub fn populate(&self, world: &mut MapWorld) -> Result<usize, SceneFileError> {
        let mut added = 0;

        for t in &self.shape_themes {
            world.add_theme(shape_theme(t)?)?;
            added += 1;
        }
        for t in &self.image_themes {
            world.add_theme(image_theme(t)?)?;
            added += 1;
        }
        for p in &self.polygons {
            let mut spec = PolygonSpec::new(points(&p.ring), p.fill);
            spec.label = p.label.clone();
            world.add_polygon(spec)?;
            added += 1;
        }
        for l in &self.lines {
            let mut spec = LineSpec::new(points(&l.points));
            spec.label = l.label.clone();
            spec.style = l.style;
            world.add_line(spec)?;
            added += 1;
        }

        let mut anchors: HashMap<&str, ObjectRef> = HashMap::new();
        for s in &self.stations {
            let mut spec = StationSpec::new(s.label.clone(), s.at.into());
            spec.tag = s.tag;
            spec.symbol = s.symbol;
            let id = world.add_station(spec)?;
            anchors.insert(s.label.as_str(), ObjectRef::station(id));
            added += 1;
        }
        for s in &self.sources {
            let mut spec = SourceSpec::new(s.label.clone(), s.at.into());
            spec.depth_km = s.depth_km;
            spec.ellipse = s.ellipse;
            let id = world.add_source(spec)?;
            anchors.insert(s.label.as_str(), ObjectRef::source(id));
            added += 1;
        }

        let resolve = |name: &Option<String>| -> Result<Vec<ObjectRef>, SceneFileError> {
            match name {
                None => Ok(Vec::new()),
                Some(n) => anchors
                    .get(n.as_str())
                    .map(|r| vec![*r])
                    .ok_or_else(|| SceneFileError::Invalid(format!("unknown anchor {n:?}"))),
            }
        };

        for a in &self.arcs {
            let mut spec = ArcSpec::between(a.from.into(), a.to.into())
                .with_kind(a.kind)
                .anchored_to(resolve(&a.anchor)?);
            spec.label = a.label.clone();
            spec.style = a.style;
            world.add_arc(spec)?;
            added += 1;
        }
        for d in &self.deltas {
            let mut spec =
                DeltaSpec::new(d.origin.into(), d.radius_deg).anchored_to(resolve(&d.anchor)?);
            spec.label = d.label.clone();
            spec.style = d.style;
            world.add_delta(spec)?;
            added += 1;
        }

        debug!(added, "scene populated");
        Ok(added)
    }
}

fn points(list: &[LatLon]) -> Vec<GeoPoint> {
    list.iter().map(|&p| p.into()).collect()
}

fn shape_theme(entry: &ShapeThemeEntry) -> Result<ThemeSpec, SceneFileError> {
    let shapes = entry
        .shapes
        .iter()
        .map(|s| Shape {
            kind: s.kind.unwrap_or(entry.kind),
            parts: s.parts.iter().map(|part| points(part)).collect(),
            value: s.value,
            label: s.label.clone(),
        })
        .collect();
    let mut theme = ShapeTheme::new(entry.kind, shapes);
    theme.fill = entry.fill;
    theme.boundary = entry.boundary;
    theme.color_scale = entry.ramp.map(RampEntry::to_scale).transpose()?;
    let mut spec = ThemeSpec::shapes(entry.name.clone(), theme);
    spec.on_off_distance = entry.on_off_distance;
    Ok(spec)
}

fn image_theme(entry: &ImageThemeEntry) -> Result<ThemeSpec, SceneFileError> {
    let grid = ScalarGrid {
        lats: entry.lats.clone(),
        lons: entry.lons.clone(),
        values: entry.values.clone(),
        no_data: entry.no_data,
    };
    let mut theme = ImageTheme::new(grid, entry.ramp.to_scale()?);
    theme.shade = entry.shade;
    theme.contour_levels = entry.contour_levels.clone();
    let mut spec = ThemeSpec::image(entry.name.clone(), theme);
    spec.on_off_distance = entry.on_off_distance;
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use projection::ProjectionKind;
    use scene::ObjectKind;

    const SCENE: &str = r#"{
        "config": { "width": 360, "height": 180, "projection": { "kind": "mercator" } },
        "stations": [
            { "label": "ANMO", "at": { "lat": 34.9, "lon": -106.5 } },
            { "label": "KEV", "at": { "lat": 69.8, "lon": 27.0 }, "tag": "above" }
        ],
        "sources": [
            { "label": "ev1", "at": { "lat": 10.0, "lon": 40.0 }, "depth_km": 33.0,
              "ellipse": { "smajax_km": 50.0, "sminax_km": 20.0, "strike_deg": 45.0 } }
        ],
        "arcs": [
            { "from": { "lat": 10.0, "lon": 40.0 }, "to": { "lat": 34.9, "lon": -106.5 }, "anchor": "ev1" }
        ],
        "deltas": [
            { "origin": { "lat": 34.9, "lon": -106.5 }, "radius_deg": 30.0, "anchor": "ANMO" }
        ],
        "shape_themes": [
            { "name": "boxes", "kind": "polygon",
              "ramp": { "min": 0.0, "max": 10.0, "steps": 4, "low": [0,0,1,1], "high": [1,0,0,1] },
              "shapes": [
                { "parts": [[{ "lat": 0, "lon": 0 }, { "lat": 0, "lon": 10 }, { "lat": 10, "lon": 10 }, { "lat": 10, "lon": 0 }]],
                  "value": 7.5 }
              ] }
        ],
        "image_themes": [
            { "name": "field", "lats": [0, 10], "lons": [0, 10], "values": [1, 2, 3, 4],
              "ramp": { "min": 0.0, "max": 4.0, "steps": 4, "low": [0,0,0,1], "high": [1,1,1,1] },
              "contour_levels": [2.5] }
        ]
    }"#;

    #[test]
    fn parses_and_populates_a_full_scene() {
        let file = SceneFile::from_json_str(SCENE).unwrap();
        assert_eq!(file.config.width, 360);
        assert_eq!(file.config.projection.kind, ProjectionKind::Mercator);
        assert_eq!(file.stations[1].tag, TagPosition::Above);

        let mut world = MapWorld::new();
        let added = file.populate(&mut world).unwrap();
        assert_eq!(added, 7);
        assert_eq!(world.stations().len(), 2);
        assert_eq!(world.themes().len(), 2);
        // The source's ellipse is owned by the store, not counted as added.
        assert_eq!(world.ellipses().len(), 1);
    }

    #[test]
    fn anchors_resolve_by_label() {
        let file = SceneFile::from_json_str(SCENE).unwrap();
        let mut world = MapWorld::new();
        file.populate(&mut world).unwrap();

        let anmo = world.ids_of(ObjectKind::Station)[0];
        let removed = world.delete_station(anmo).unwrap();
        let kinds: Vec<ObjectKind> = removed.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ObjectKind::Station, ObjectKind::Delta]);
        assert_eq!(world.arcs().len(), 1);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let file = SceneFile::from_json_str("{}").unwrap();
        assert_eq!(file, SceneFile::default());
        assert_eq!(file.populate(&mut MapWorld::new()).unwrap(), 0);
    }

    #[test]
    fn unknown_anchor_is_rejected() {
        let file = SceneFile::from_json_str(
            r#"{ "deltas": [ { "origin": { "lat": 0, "lon": 0 }, "radius_deg": 5, "anchor": "nope" } ] }"#,
        )
        .unwrap();
        let err = file.populate(&mut MapWorld::new()).unwrap_err();
        assert_eq!(err, SceneFileError::Invalid("unknown anchor \"nope\"".into()));
    }

    #[test]
    fn bad_ramp_and_bad_grid_are_reported() {
        let ramp = r#"{ "min": 1.0, "max": 0.0, "steps": 4, "low": [0,0,0,1], "high": [1,1,1,1] }"#;
        let raw = format!(
            r#"{{ "image_themes": [ {{ "name": "f", "lats": [0, 1], "lons": [0, 1], "values": [1, 2, 3, 4], "ramp": {ramp} }} ] }}"#
        );
        let file = SceneFile::from_json_str(&raw).unwrap();
        assert!(matches!(file.populate(&mut MapWorld::new()), Err(SceneFileError::Invalid(_))));

        let mut file = SceneFile::from_json_str(SCENE).unwrap();
        file.image_themes[0].values.pop();
        assert!(matches!(
            file.populate(&mut MapWorld::new()),
            Err(SceneFileError::Store(StoreError::MalformedGeometry(_)))
        ));
    }

    #[test]
    fn parse_and_io_failures() {
        assert!(matches!(SceneFile::from_json_str("[1, 2"), Err(SceneFileError::Parse(_))));
        assert!(matches!(
            SceneFile::load(Path::new("/no/such/scene.json")),
            Err(SceneFileError::Io(_))
        ));
    }
}
