use serde::{Deserialize, Serialize};

/// Linear RGBA in `[0, 1]`.
pub type Color = [f32; 4];

pub mod colors {
    use super::Color;

    pub const BLACK: Color = [0.0, 0.0, 0.0, 1.0];
    pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];
    pub const RED: Color = [1.0, 0.0, 0.0, 1.0];
    pub const GREEN: Color = [0.0, 0.6, 0.0, 1.0];
    pub const BLUE: Color = [0.0, 0.0, 1.0, 1.0];
    pub const YELLOW: Color = [1.0, 1.0, 0.0, 1.0];
    pub const GRAY: Color = [0.5, 0.5, 0.5, 1.0];
    pub const OCEAN: Color = [0.75, 0.85, 0.95, 1.0];
    pub const LAND: Color = [0.93, 0.9, 0.8, 1.0];
}

pub fn to_rgba8(c: Color) -> [u8; 4] {
    c.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymbolShape {
    #[default]
    Circle,
    Square,
    Triangle,
    InvertedTriangle,
    Diamond,
    Plus,
    Cross,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolStyle {
    pub shape: SymbolShape,
    /// Edge length (or diameter) in pixels.
    pub size_px: f64,
    pub outline: Color,
    pub fill: Option<Color>,
}

impl Default for SymbolStyle {
    fn default() -> Self {
        Self {
            shape: SymbolShape::Circle,
            size_px: 8.0,
            outline: colors::BLACK,
            fill: None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineStyle {
    pub color: Color,
    pub width_px: u32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: colors::BLACK,
            width_px: 1,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FillStyle {
    pub fill: Option<Color>,
    pub boundary: Option<Color>,
}

/// Where a station label sits relative to its symbol.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagPosition {
    #[default]
    Right,
    Left,
    Above,
    Below,
    Hidden,
}

/// Piecewise-constant value-to-color mapping.
///
/// `colors.len() == levels.len() + 1`; values below `levels[0]` take
/// `colors[0]`, values at or above `levels[i]` take `colors[i + 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    levels: Vec<f64>,
    colors: Vec<Color>,
}

impl ColorScale {
    pub fn new(levels: Vec<f64>, colors: Vec<Color>) -> Option<Self> {
        if colors.len() != levels.len() + 1 {
            return None;
        }
        if levels.windows(2).any(|w| !(w[0] < w[1])) {
            return None;
        }
        Some(Self { levels, colors })
    }

    /// Evenly spaced scale from `min` to `max` interpolating `low` to `high`.
    pub fn ramp(min: f64, max: f64, steps: usize, low: Color, high: Color) -> Option<Self> {
        if steps < 2 || !(min < max) {
            return None;
        }
        let levels: Vec<f64> = (1..steps)
            .map(|i| min + (max - min) * i as f64 / steps as f64)
            .collect();
        let colors: Vec<Color> = (0..steps)
            .map(|i| {
                let t = i as f32 / (steps - 1) as f32;
                std::array::from_fn(|c| low[c] + (high[c] - low[c]) * t)
            })
            .collect();
        Self::new(levels, colors)
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn color_for(&self, value: f64) -> Color {
        let idx = self.levels.partition_point(|&l| l <= value);
        self.colors[idx]
    }
}
