use serde::{Deserialize, Serialize};

/// Sample counts used when materializing derived polylines.
///
/// Counts are numbers of vertices; closed rings repeat their first vertex
/// at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterializeConfig {
    pub arc_points: usize,
    pub delta_points: usize,
    pub ellipse_points: usize,
    pub rectangle_edge_points: usize,
}

impl Default for MaterializeConfig {
    fn default() -> Self {
        Self {
            arc_points: 100,
            delta_points: 181,
            ellipse_points: 73,
            rectangle_edge_points: 16,
        }
    }
}
