pub mod canvas;
pub mod contour;
pub mod graticule;
pub mod labels;
pub mod path;
pub mod raster;
pub mod renderer;
pub mod scanline;
pub mod symbology;

pub use canvas::{DisplayList, PixelBuffer, Primitive, Span, Surface};
pub use renderer::*;
pub use scanline::{Fill, FillOutcome, fill_shape};
