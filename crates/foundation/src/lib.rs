pub mod arena;
pub mod bounds;
pub mod ids;
pub mod math;

// Ids, arenas and spherical math shared by every other crate.
pub use arena::*;
pub use bounds::*;
pub use ids::*;
