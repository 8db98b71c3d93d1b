//! Game session: lifecycle states, the state machine, and simulation.

pub mod state;
pub mod error;
pub mod machine;
pub mod simulate;

pub use state::{GameMode, GameState};
pub use error::InvalidAction;
pub use machine::{Advance, GameEnd, RoundRecord, Session};
pub use simulate::{simulate_match, MatchSummary};
