use std::path::Path;

use layers::RenderStyle;
use projection::ProjectionParams;
use scene::MaterializeConfig;
use serde::{Deserialize, Serialize};

use crate::picking::PickThresholds;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "config read failed: {msg}"),
            ConfigError::Parse(msg) => write!(f, "config invalid: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Categories whose symbols may be dragged to a new position.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MovableFlags {
    pub stations: bool,
    pub sources: bool,
}

/// Plot settings; every field has a default so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub projection: ProjectionParams,
    pub width: u32,
    pub height: u32,
    pub picking: PickThresholds,
    pub materialize: MaterializeConfig,
    pub movable: MovableFlags,
    /// Pointer-down on empty space starts a measurement.
    pub measurement_enabled: bool,
    pub crosshair: bool,
    pub style: RenderStyle,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionParams::default(),
            width: 720,
            height: 360,
            picking: PickThresholds::default(),
            materialize: MaterializeConfig::default(),
            movable: MovableFlags::default(),
            measurement_enabled: false,
            crosshair: false,
            style: RenderStyle::default(),
        }
    }
}

impl MapConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use projection::ProjectionKind;

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = MapConfig::from_json_str(
            r#"{ "width": 400, "projection": { "kind": "orthographic" }, "movable": { "stations": true } }"#,
        )
        .unwrap();
        assert_eq!(cfg.width, 400);
        assert_eq!(cfg.height, 360);
        assert_eq!(cfg.projection.kind, ProjectionKind::Orthographic);
        assert!(cfg.movable.stations);
        assert!(!cfg.movable.sources);
        assert_eq!(cfg.picking, PickThresholds::default());
    }

    #[test]
    fn round_trips_through_json() {
        let mut cfg = MapConfig::default();
        cfg.measurement_enabled = true;
        cfg.materialize.arc_points = 12;
        let back = MapConfig::from_json_str(&cfg.to_json_string().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn reports_parse_and_io_failures() {
        assert!(matches!(MapConfig::from_json_str("{ nope"), Err(ConfigError::Parse(_))));
        let missing = MapConfig::load(Path::new("/definitely/not/here.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
