pub mod azimuthal;
pub mod cylindrical;
pub mod engine;
pub mod error;
pub mod kind;
pub mod utm;
pub mod view;

pub use engine::*;
pub use error::*;
pub use kind::*;
pub use utm::UtmCell;
pub use view::*;
