//! Ordered, single-owner card sequence.
//!
//! The front of the sequence is the top of the deck (the next card to be
//! played); new cards go to the bottom. Backed by `im::Vector` so a deck
//! clone is O(1), which keeps session snapshots and simulations cheap.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardId, CardRef};
use crate::core::Side;

/// One party's deck.
///
/// ## Usage
///
/// ```
/// use rust_trumps::cards::{Card, CardStats};
/// use rust_trumps::core::Side;
/// use rust_trumps::deck::Deck;
///
/// let a = Card::new("a", "Alpha", CardStats::default()).into_ref();
/// let b = Card::new("b", "Beta", CardStats::default()).into_ref();
///
/// let mut deck = Deck::from_cards(Side::Player, vec![a.clone()]);
/// deck.push_bottom(b.clone());
///
/// assert_eq!(deck.peek_top(), Some(&a));
/// assert_eq!(deck.remove_top(), Some(a));
/// assert_eq!(deck.peek_top(), Some(&b));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    owner: Side,
    cards: Vector<CardRef>,
}

impl Deck {
    /// Create an empty deck.
    #[must_use]
    pub fn new(owner: Side) -> Self {
        Self {
            owner,
            cards: Vector::new(),
        }
    }

    /// Create a deck from cards listed top first.
    pub fn from_cards(owner: Side, cards: impl IntoIterator<Item = CardRef>) -> Self {
        Self {
            owner,
            cards: cards.into_iter().collect(),
        }
    }

    /// A deck of `count` hidden-card placeholders.
    #[must_use]
    pub fn placeholders(owner: Side, count: usize) -> Self {
        let hidden = Card::placeholder().into_ref();
        Self::from_cards(owner, std::iter::repeat(hidden).take(count))
    }

    /// The owning side.
    #[must_use]
    pub fn owner(&self) -> Side {
        self.owner
    }

    /// The next card to be played.
    #[must_use]
    pub fn peek_top(&self) -> Option<&CardRef> {
        self.cards.front()
    }

    /// Take the top card off the deck.
    pub fn remove_top(&mut self) -> Option<CardRef> {
        self.cards.pop_front()
    }

    /// Put a card under the deck.
    pub fn push_bottom(&mut self, card: CardRef) {
        self.cards.push_back(card);
    }

    /// Number of cards. Doubles as the score.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the deck is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Check if a card with this id is in the deck.
    #[must_use]
    pub fn contains(&self, id: &CardId) -> bool {
        self.cards.iter().any(|c| &c.id == id)
    }

    /// Iterate over cards, top first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CardRef> + ExactSizeIterator {
        self.cards.iter()
    }
}
