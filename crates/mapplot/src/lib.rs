pub mod config;
pub mod events;
pub mod interaction;
pub mod measure;
pub mod picking;
pub mod plot;
pub mod polar;
pub mod utm_select;

pub use config::{ConfigError, MapConfig, MovableFlags};
pub use events::{CursorInfo, MapEvent, SelectionTarget};
pub use interaction::{Interaction, InteractionState};
pub use measure::Measurement;
pub use picking::{Pick, PickMode, PickTarget, PickThresholds, Picker};
pub use plot::MapPlot;
pub use polar::{PolarHandle, PolarSelection};
