//! Game rules: round resolution, card redistribution, turn allocation.
//!
//! All three are pure functions of their inputs. The session composes
//! them; nothing here knows about modes, states, or the network.

pub mod engine;
pub mod redistribute;
pub mod turn;

pub use engine::{resolve_round, Outcome};
pub use redistribute::{redistribute, Transfer};
pub use turn::{next_turn, DRAW_KEEPS_CHOOSER};
