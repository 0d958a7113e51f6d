pub mod components;
pub mod config;
pub mod entity;
pub mod error;
pub mod materialize;
pub mod mirror;
pub mod selection;
pub mod world;

pub use config::MaterializeConfig;
pub use entity::{ObjectKind, ObjectRef};
pub use error::{StoreError, StoreResult};
pub use mirror::{Mutation, MutationLog, ObjectSpec, StoreObserver, ThemeEdit};
pub use selection::SelectionSet;
pub use world::*;
