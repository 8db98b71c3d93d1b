//! Turn allocator.
//!
//! The winner of a round leads the next one. On a draw the party that
//! chose the attribute keeps the lead ([`DRAW_KEEPS_CHOOSER`]).

use crate::core::Side;

use super::engine::Outcome;

/// Named draw policy: after a draw, the chooser chooses again.
pub const DRAW_KEEPS_CHOOSER: &str = "chooser-keeps-lead";

/// Who selects the attribute for the next round.
///
/// ```
/// use rust_trumps::core::Side;
/// use rust_trumps::rules::{next_turn, Outcome};
///
/// assert_eq!(next_turn(Outcome::WinB, Side::Player), Side::Opponent);
/// assert_eq!(next_turn(Outcome::Draw, Side::Player), Side::Player);
/// ```
#[must_use]
pub fn next_turn(outcome: Outcome, previous: Side) -> Side {
    outcome.winner().unwrap_or(previous)
}
