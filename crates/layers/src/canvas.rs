//! Device-space drawing primitives and the surfaces that consume them.

use foundation::math::Vec2;
use scene::components::{Color, LineStyle, SymbolStyle, to_rgba8};

use crate::symbology::{symbol_contains, symbol_outline, symbol_strokes};

/// Horizontal run of pixels on one device row, columns inclusive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub row: u32,
    pub x0: u32,
    pub x1: u32,
}

impl Span {
    pub fn new(row: u32, x0: u32, x1: u32) -> Self {
        Self { row, x0, x1 }
    }

    pub fn len(&self) -> u32 {
        self.x1 - self.x0 + 1
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        self.row == row && (self.x0..=self.x1).contains(&col)
    }
}

/// External drawing target.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn clear(&mut self, color: Color);
    fn fill_span(&mut self, span: Span, color: Color);
    fn stroke(&mut self, a: Vec2, b: Vec2, style: LineStyle);
    fn symbol(&mut self, at: Vec2, style: &SymbolStyle);
    fn text(&mut self, at: Vec2, text: &str, color: Color);

    /// Device-space circle, approximated by segments.
    fn circle(&mut self, center: Vec2, radius: f64, style: LineStyle) {
        let n = 48;
        let point = |i: u32| {
            let t = std::f64::consts::TAU * f64::from(i) / f64::from(n);
            Vec2::new(center.x + radius * t.cos(), center.y + radius * t.sin())
        };
        for i in 0..n {
            self.stroke(point(i), point(i + 1), style);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Clear(Color),
    Span(Span, Color),
    Segment(Vec2, Vec2, LineStyle),
    Symbol(Vec2, SymbolStyle),
    Text(Vec2, String, Color),
}

/// Surface that records primitives for a host to replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    width: u32,
    height: u32,
    pub primitives: Vec<Primitive>,
}

impl DisplayList {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            primitives: Vec::new(),
        }
    }

    pub fn spans(&self) -> impl Iterator<Item = (Span, Color)> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Span(s, c) => Some((*s, *c)),
            _ => None,
        })
    }

    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Segment(a, b, _) => Some((*a, *b)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text(_, t, _) => Some(t.as_str()),
            _ => None,
        })
    }

    /// Draws every recorded primitive onto `surface`, in order. Returns
    /// how many were drawn.
    pub fn replay(&self, surface: &mut dyn Surface) -> usize {
        for p in &self.primitives {
            match p {
                Primitive::Clear(c) => surface.clear(*c),
                Primitive::Span(s, c) => surface.fill_span(*s, *c),
                Primitive::Segment(a, b, style) => surface.stroke(*a, *b, *style),
                Primitive::Symbol(at, style) => surface.symbol(*at, style),
                Primitive::Text(at, text, c) => surface.text(*at, text, *c),
            }
        }
        self.primitives.len()
    }
}

impl Surface for DisplayList {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Color) {
        self.primitives.clear();
        self.primitives.push(Primitive::Clear(color));
    }

    fn fill_span(&mut self, span: Span, color: Color) {
        self.primitives.push(Primitive::Span(span, color));
    }

    fn stroke(&mut self, a: Vec2, b: Vec2, style: LineStyle) {
        self.primitives.push(Primitive::Segment(a, b, style));
    }

    fn symbol(&mut self, at: Vec2, style: &SymbolStyle) {
        self.primitives.push(Primitive::Symbol(at, *style));
    }

    fn text(&mut self, at: Vec2, text: &str, color: Color) {
        self.primitives.push(Primitive::Text(at, text.to_owned(), color));
    }
}

/// RGBA8 raster with source-over blending.
///
/// Text has no glyph rasterizer here; it is collected in `texts` for the
/// host to draw on top.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
    pub texts: Vec<(Vec2, String, Color)>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
            texts: Vec::new(),
        }
    }

    /// Reallocates for a new device size; contents are cleared.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    fn blend(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let a = color[3].clamp(0.0, 1.0);
        if a >= 1.0 {
            let c = to_rgba8(color);
            self.data[i..i + 4].copy_from_slice(&c);
            return;
        }
        for ch in 0..3 {
            let dst = f32::from(self.data[i + ch]) / 255.0;
            let v = color[ch] * a + dst * (1.0 - a);
            self.data[i + ch] = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        let dst_a = f32::from(self.data[i + 3]) / 255.0;
        self.data[i + 3] = ((a + dst_a * (1.0 - a)).clamp(0.0, 1.0) * 255.0).round() as u8;
    }

    fn dot(&mut self, x: i64, y: i64, width: u32, color: Color) {
        let w = i64::from(width.max(1));
        let lo = -(w - 1) / 2;
        for dy in lo..lo + w {
            for dx in lo..lo + w {
                self.blend(x + dx, y + dy, color);
            }
        }
    }
}

impl Surface for PixelBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Color) {
        let c = to_rgba8(color);
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&c);
        }
        self.texts.clear();
    }

    fn fill_span(&mut self, span: Span, color: Color) {
        if span.row >= self.height {
            return;
        }
        let x1 = span.x1.min(self.width.saturating_sub(1));
        for x in span.x0..=x1 {
            self.blend(i64::from(x), i64::from(span.row), color);
        }
    }

    /// Bresenham between pixel centres.
    fn stroke(&mut self, a: Vec2, b: Vec2, style: LineStyle) {
        if !(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()) {
            return;
        }
        let limit = 4.0 * f64::from(self.width.max(self.height)) + 16.0;
        if a.x.abs().max(a.y.abs()).max(b.x.abs()).max(b.y.abs()) > limit {
            return;
        }
        let (mut x0, mut y0) = (a.x.floor() as i64, a.y.floor() as i64);
        let (x1, y1) = (b.x.floor() as i64, b.y.floor() as i64);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.dot(x0, y0, style.width_px, style.color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn symbol(&mut self, at: Vec2, style: &SymbolStyle) {
        let h = (0.5 * style.size_px).ceil() as i64 + 1;
        let (cx, cy) = (at.x.floor() as i64, at.y.floor() as i64);
        if let Some(fill) = style.fill {
            for dy in -h..=h {
                for dx in -h..=h {
                    if symbol_contains(style.shape, style.size_px, dx as f64, dy as f64) {
                        self.blend(cx + dx, cy + dy, fill);
                    }
                }
            }
        }
        let line = LineStyle {
            color: style.outline,
            width_px: 1,
        };
        let outline = symbol_outline(style.shape, style.size_px);
        for i in 0..outline.len() {
            let p = outline[i];
            let q = outline[(i + 1) % outline.len()];
            self.stroke(at + p, at + q, line);
        }
        for (p, q) in symbol_strokes(style.shape, style.size_px) {
            self.stroke(at + p, at + q, line);
        }
    }

    fn text(&mut self, at: Vec2, text: &str, color: Color) {
        self.texts.push((at, text.to_owned(), color));
    }
}
