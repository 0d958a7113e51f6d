//! Symbol geometry shared by the pixel rasterizer and hit testing.

use foundation::math::Vec2;
use scene::components::{Color, SymbolShape, SymbolStyle};

/// Closed outline of a polygonal symbol, as offsets from its centre in
/// device pixels (y down). Empty for stroke-only symbols.
pub fn symbol_outline(shape: SymbolShape, size: f64) -> Vec<Vec2> {
    let h = 0.5 * size;
    match shape {
        SymbolShape::Square => vec![
            Vec2::new(-h, -h),
            Vec2::new(h, -h),
            Vec2::new(h, h),
            Vec2::new(-h, h),
        ],
        SymbolShape::Triangle => vec![Vec2::new(0.0, -h), Vec2::new(h, h), Vec2::new(-h, h)],
        SymbolShape::InvertedTriangle => {
            vec![Vec2::new(-h, -h), Vec2::new(h, -h), Vec2::new(0.0, h)]
        }
        SymbolShape::Diamond => vec![
            Vec2::new(0.0, -h),
            Vec2::new(h, 0.0),
            Vec2::new(0.0, h),
            Vec2::new(-h, 0.0),
        ],
        SymbolShape::Circle => (0..24)
            .map(|i| {
                let t = std::f64::consts::TAU * f64::from(i) / 24.0;
                Vec2::new(h * t.cos(), h * t.sin())
            })
            .collect(),
        SymbolShape::Plus | SymbolShape::Cross => Vec::new(),
    }
}

/// Stroke segments of `plus` and `cross` symbols.
pub fn symbol_strokes(shape: SymbolShape, size: f64) -> Vec<(Vec2, Vec2)> {
    let h = 0.5 * size;
    match shape {
        SymbolShape::Plus => vec![
            (Vec2::new(-h, 0.0), Vec2::new(h, 0.0)),
            (Vec2::new(0.0, -h), Vec2::new(0.0, h)),
        ],
        SymbolShape::Cross => vec![
            (Vec2::new(-h, -h), Vec2::new(h, h)),
            (Vec2::new(-h, h), Vec2::new(h, -h)),
        ],
        _ => Vec::new(),
    }
}

/// Whether the offset `(dx, dy)` from the symbol centre falls on the symbol.
pub fn symbol_contains(shape: SymbolShape, size: f64, dx: f64, dy: f64) -> bool {
    let h = 0.5 * size;
    match shape {
        SymbolShape::Circle => dx * dx + dy * dy <= h * h,
        SymbolShape::Square => dx.abs() <= h && dy.abs() <= h,
        SymbolShape::Diamond => dx.abs() + dy.abs() <= h,
        SymbolShape::Plus => (dx.abs() <= 0.5 && dy.abs() <= h) || (dy.abs() <= 0.5 && dx.abs() <= h),
        SymbolShape::Cross => {
            dx.abs() <= h && dy.abs() <= h && ((dx - dy).abs() <= 0.75 || (dx + dy).abs() <= 0.75)
        }
        SymbolShape::Triangle | SymbolShape::InvertedTriangle => {
            point_in_polygon(&symbol_outline(shape, size), Vec2::new(dx, dy))
        }
    }
}

/// Even-odd point-in-polygon.
pub fn point_in_polygon(poly: &[Vec2], p: Vec2) -> bool {
    let mut inside = false;
    let n = poly.len();
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x <= x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Style used for a selected point object.
pub fn highlighted(style: &SymbolStyle, highlight: Color) -> SymbolStyle {
    SymbolStyle {
        size_px: style.size_px + 4.0,
        fill: Some(highlight),
        ..*style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_matches_shape_extent() {
        assert!(symbol_contains(SymbolShape::Circle, 10.0, 3.0, 3.0));
        assert!(!symbol_contains(SymbolShape::Circle, 10.0, 4.0, 4.0));
        assert!(symbol_contains(SymbolShape::Square, 10.0, 4.9, -4.9));
        assert!(!symbol_contains(SymbolShape::Diamond, 10.0, 3.0, 3.0));
        assert!(symbol_contains(SymbolShape::Triangle, 10.0, 0.0, 4.0));
        assert!(!symbol_contains(SymbolShape::Triangle, 10.0, 0.0, -6.0));
        assert!(symbol_contains(SymbolShape::InvertedTriangle, 10.0, 0.0, -4.0));
    }

    #[test]
    fn stroke_symbols_have_no_outline() {
        assert!(symbol_outline(SymbolShape::Plus, 8.0).is_empty());
        assert_eq!(symbol_strokes(SymbolShape::Cross, 8.0).len(), 2);
        assert!(symbol_contains(SymbolShape::Plus, 8.0, 0.0, 3.5));
        assert!(!symbol_contains(SymbolShape::Plus, 8.0, 2.0, 2.0));
    }

    #[test]
    fn highlight_grows_and_fills() {
        let base = SymbolStyle::default();
        let hi = highlighted(&base, [1.0, 1.0, 0.0, 1.0]);
        assert_eq!(hi.size_px, base.size_px + 4.0);
        assert_eq!(hi.shape, base.shape);
        assert_eq!(hi.fill, Some([1.0, 1.0, 0.0, 1.0]));
    }
}
