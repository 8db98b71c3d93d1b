//! Deck redistribution rule (winner takes all).
//!
//! After a round both played cards leave the top of their decks:
//! - `WinA`: A's card then B's card go under A's deck
//! - `WinB`: B's card then A's card go under B's deck
//! - `Draw`: each card goes back under its owner's deck
//!
//! Total card count never changes. A winner gains one card net, the loser
//! loses one, a draw changes nothing.

use smallvec::SmallVec;

use crate::cards::CardRef;
use crate::core::{Side, SideMap};
use crate::deck::Deck;

use super::engine::Outcome;

/// Cards each side received at the bottom of its deck, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub outcome: Outcome,
    pub received: SideMap<SmallVec<[CardRef; 2]>>,
}

impl Transfer {
    /// Net change in deck size for `side`.
    #[must_use]
    pub fn delta(&self, side: Side) -> i64 {
        self.received[side].len() as i64 - 1
    }
}

/// Apply a round's outcome to both decks.
///
/// `played` are the two cards revealed this round. The top of each deck is
/// discarded and replaced by the played cards as the outcome dictates, so a
/// deck whose top is a hidden-card placeholder picks up the real revealed
/// card instead.
pub fn redistribute(
    decks: &mut SideMap<Deck>,
    played: &SideMap<CardRef>,
    outcome: Outcome,
) -> Transfer {
    for side in Side::BOTH {
        if decks[side].remove_top().is_none() {
            tracing::warn!(%side, "redistributing from an empty deck");
        }
    }

    let mut received: SideMap<SmallVec<[CardRef; 2]>> = SideMap::default();
    match outcome.winner() {
        Some(winner) => {
            received[winner].push(played[winner].clone());
            received[winner].push(played[winner.other()].clone());
        }
        None => {
            for side in Side::BOTH {
                received[side].push(played[side].clone());
            }
        }
    }

    for side in Side::BOTH {
        for card in &received[side] {
            decks[side].push_bottom(card.clone());
        }
    }

    Transfer { outcome, received }
}
