//! Image-theme shading.
//!
//! Cylindrical views share one latitude per row and one longitude per
//! column, so the grid is indexed directly from the pixel centres. Every
//! other projection inverts each pixel centre to a geographic point first;
//! pixels with no inverse are left untouched.

use foundation::math::{GeoPoint, normalize_lon};
use projection::{Projection, View};
use scene::components::{Color, ImageTheme};

use crate::canvas::Span;

/// Shaded runs of `theme` over the view, merged where neighbouring pixels
/// share a colour.
pub fn shade_image(theme: &ImageTheme, projection: &Projection, view: &View) -> Vec<(Span, Color)> {
    if !theme.shade {
        return Vec::new();
    }
    let mut runs = RunBuilder::default();
    if projection.is_cylindrical() {
        let center = projection.lon_center();
        let lons: Vec<f64> = (0..view.width())
            .map(|c| normalize_lon(view.col_plane_x(c), center))
            .collect();
        for row in 0..view.height() {
            let y = view.row_plane_y(row);
            let Some(lat) = projection.unproject(center, y).map(|g| g.lat) else {
                continue;
            };
            for (col, lon) in lons.iter().enumerate() {
                let value = theme.grid.value_at(GeoPoint { lat, lon: *lon });
                runs.push(row, col as u32, value.map(|v| theme.color_scale.color_for(v)));
            }
            runs.end_row();
        }
    } else {
        for row in 0..view.height() {
            let y = view.row_plane_y(row);
            for col in 0..view.width() {
                let color = projection
                    .unproject(view.col_plane_x(col), y)
                    .and_then(|g| theme.grid.value_at(g))
                    .map(|v| theme.color_scale.color_for(v));
                runs.push(row, col, color);
            }
            runs.end_row();
        }
    }
    runs.finish()
}

/// Grid value under the device pixel `(px, py)`, if any.
pub fn sample_at(theme: &ImageTheme, projection: &Projection, view: &View, px: f64, py: f64) -> Option<f64> {
    let p = view.to_plane(px, py);
    let g = projection.unproject(p.x, p.y)?;
    theme.grid.value_at(g)
}

#[derive(Default)]
struct RunBuilder {
    out: Vec<(Span, Color)>,
    open: Option<(Span, Color)>,
}

impl RunBuilder {
    fn push(&mut self, row: u32, col: u32, color: Option<Color>) {
        match (self.open.as_mut(), color) {
            (Some((span, c)), Some(color)) if *c == color && span.x1 + 1 == col => {
                span.x1 = col;
            }
            (_, color) => {
                self.end_row();
                self.open = color.map(|c| (Span::new(row, col, col), c));
            }
        }
    }

    fn end_row(&mut self) {
        if let Some(run) = self.open.take() {
            self.out.push(run);
        }
    }

    fn finish(mut self) -> Vec<(Span, Color)> {
        self.end_row();
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::bounds::Aabb2;
    use projection::ProjectionKind;
    use scene::components::{ColorScale, ScalarGrid, colors};

    fn half_grid() -> ImageTheme {
        // West half 0, east half 10, over lon -180..180 and lat -90..90.
        let lats = vec![-90.0, 0.0, 90.0];
        let lons = vec![-180.0, -90.0, 0.0, 90.0, 180.0];
        let values = lats
            .iter()
            .flat_map(|_| lons.iter().map(|&lon| if lon < 0.0 { 0.0 } else { 10.0 }))
            .collect();
        let grid = ScalarGrid {
            lats,
            lons,
            values,
            no_data: None,
        };
        let scale = ColorScale::new(vec![5.0], vec![colors::BLUE, colors::RED]).unwrap();
        ImageTheme::new(grid, scale)
    }

    #[test]
    fn cylindrical_rows_are_run_length_merged() {
        let proj = Projection::new(ProjectionKind::LinearCylindrical);
        let view = View::new(Aabb2::new([-180.0, -90.0], [180.0, 90.0]), 36, 18);
        let runs = shade_image(&half_grid(), &proj, &view);
        let row0: Vec<_> = runs.iter().filter(|(s, _)| s.row == 0).collect();
        assert!(row0.len() >= 2 && row0.len() <= 3, "{row0:?}");
        assert_eq!(row0[0].1, colors::BLUE);
        assert_eq!(row0[row0.len() - 1].1, colors::RED);
        let covered: u32 = runs.iter().map(|(s, _)| s.len()).sum();
        assert_eq!(covered, 36 * 18);
    }

    #[test]
    fn orthographic_leaves_the_outside_of_the_disk_blank() {
        let proj = Projection::new(ProjectionKind::Orthographic);
        let view = View::new(Aabb2::new([-1.0, -1.0], [1.0, 1.0]), 20, 20);
        let runs = shade_image(&half_grid(), &proj, &view);
        let covered: u32 = runs.iter().map(|(s, _)| s.len()).sum();
        assert!(covered < 400);
        assert!(covered > 250);
        // Corner pixels are beyond the horizon.
        assert!(!runs.iter().any(|(s, _)| s.contains(0, 0)));
    }

    #[test]
    fn sample_reads_the_value_under_a_pixel() {
        let proj = Projection::new(ProjectionKind::LinearCylindrical);
        let view = View::new(Aabb2::new([-180.0, -90.0], [180.0, 90.0]), 360, 180);
        let theme = half_grid();
        assert_eq!(sample_at(&theme, &proj, &view, 10.5, 90.0), Some(0.0));
        assert_eq!(sample_at(&theme, &proj, &view, 300.5, 90.0), Some(10.0));
    }

    #[test]
    fn unshaded_theme_produces_nothing() {
        let proj = Projection::new(ProjectionKind::LinearCylindrical);
        let view = View::new(Aabb2::new([-180.0, -90.0], [180.0, 90.0]), 36, 18);
        let mut theme = half_grid();
        theme.shade = false;
        assert!(shade_image(&theme, &proj, &view).is_empty());
    }
}
