//! Room data model and room registry (spec §3, §4.3).
//!
//! [`model`] defines the shared [`model::GameState`] that both the registry
//! and the engine mutate; [`registry::RoomRegistry`] owns lobby-phase
//! lifecycle operations (create, join, leave, config, ready, start). Once a
//! room leaves the lobby, `dg-engine` takes over phase transitions against
//! the same state.
mod error;
mod model;
mod registry;

pub use error::RegistryError;
pub use model::*;
pub use registry::RoomRegistry;
