//! Core engine types: parties, RNG, configuration.
//!
//! These are the building blocks every other module depends on.

pub mod player;
pub mod rng;
pub mod config;

pub use player::{Role, Side, SideMap};
pub use rng::{GameRng, GameRngState};
pub use config::{ConfigError, SessionConfig};
