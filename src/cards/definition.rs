//! Card records.
//!
//! A `Card` is immutable once created. Decks hold `CardRef`s so the same
//! card can sit in one deck and in both parties' round views at once
//! without copying.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::attributes::{Attribute, CardStats};

/// Identity of the placeholder card the guest uses for the host's hidden deck.
pub const PLACEHOLDER_ID: &str = "???";

/// Unique card identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    /// Create a new card ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Shared handle to an immutable card.
pub type CardRef = Arc<Card>;

/// A playable card.
///
/// ```
/// use rust_trumps::cards::{Attribute, Card, CardStats};
///
/// let card = Card::new("1", "BTS", CardStats { members: 7, debut_year: 2013, ..Default::default() });
/// assert_eq!(card.stat(Attribute::Members), 7);
/// assert!(!card.is_placeholder());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub stats: CardStats,
}

impl Card {
    /// Create a new card.
    pub fn new(id: impl Into<String>, name: impl Into<String>, stats: CardStats) -> Self {
        Self {
            id: CardId::new(id),
            name: name.into(),
            stats,
        }
    }

    /// The render-only stand-in for a card the guest cannot see.
    ///
    /// Never compared against.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_ID, PLACEHOLDER_ID, CardStats::default())
    }

    /// Whether this is the hidden-card stand-in.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.id.as_str() == PLACEHOLDER_ID
    }

    /// Read one attribute.
    #[must_use]
    pub fn stat(&self, attribute: Attribute) -> u32 {
        self.stats.get(attribute)
    }

    /// Wrap in a shared handle.
    #[must_use]
    pub fn into_ref(self) -> CardRef {
        Arc::new(self)
    }
}
