//! Card catalog: the pool a game is dealt from.
//!
//! `CardCatalog::standard()` is the built-in 32-card pool. Custom pools
//! can be registered card by card for tests and variants.

use rustc_hash::FxHashMap;

use super::attributes::CardStats;
use super::definition::{Card, CardId, CardRef};

/// Built-in pool: (id, name, [members, albums, debut year, fame, awards]).
const STANDARD_POOL: [(&str, &str, [u32; 5]); 32] = [
    ("1", "BTS", [7, 9, 2013, 40, 483]),
    ("2", "BLACKPINK", [4, 2, 2016, 39, 120]),
    ("3", "EXO", [9, 7, 2012, 36, 170]),
    ("4", "TWICE", [9, 7, 2015, 37, 115]),
    ("5", "SEVENTEEN", [13, 4, 2015, 35, 85]),
    ("6", "Red Velvet", [5, 3, 2014, 33, 60]),
    ("7", "NCT 127", [9, 5, 2016, 32, 45]),
    ("8", "MAMAMOO", [4, 4, 2014, 28, 40]),
    ("9", "BIGBANG", [4, 3, 2006, 38, 140]),
    ("10", "Girls' Generation", [8, 6, 2007, 38, 130]),
    ("11", "Super Junior", [9, 11, 2005, 34, 110]),
    ("12", "SHINee", [5, 7, 2008, 35, 95]),
    ("13", "2NE1", [4, 2, 2009, 36, 80]),
    ("14", "Wonder Girls", [4, 3, 2007, 30, 65]),
    ("15", "TVXQ!", [2, 8, 2003, 32, 90]),
    ("16", "SISTAR", [4, 2, 2010, 29, 55]),
    ("17", "Stray Kids", [8, 4, 2018, 35, 55]),
    ("18", "NewJeans", [5, 2, 2022, 36, 30]),
    ("19", "TXT", [5, 3, 2019, 32, 40]),
    ("20", "ITZY", [5, 1, 2019, 31, 45]),
    ("21", "AESPA", [4, 1, 2020, 33, 48]),
    ("22", "ENHYPEN", [7, 2, 2020, 30, 35]),
    ("23", "IVE", [6, 1, 2021, 32, 38]),
    ("24", "LE SSERAFIM", [5, 1, 2022, 31, 25]),
    ("25", "(G)I-DLE", [5, 2, 2018, 31, 50]),
    ("26", "ATEEZ", [8, 2, 2018, 30, 30]),
    ("27", "MONSTA X", [6, 4, 2015, 29, 60]),
    ("28", "TREASURE", [10, 2, 2020, 26, 20]),
    ("29", "NMIXX", [6, 1, 2022, 25, 10]),
    ("30", "STAYC", [6, 1, 2020, 24, 15]),
    ("31", "DREAMCATCHER", [7, 2, 2017, 23, 5]),
    ("32", "THE BOYZ", [11, 2, 2017, 27, 35]),
];

/// Ordered pool of cards with lookup by id.
///
/// ## Example
///
/// ```
/// use rust_trumps::cards::{CardCatalog, CardId};
///
/// let catalog = CardCatalog::standard();
/// assert_eq!(catalog.len(), 32);
/// assert_eq!(catalog.get(&CardId::new("1")).unwrap().name, "BTS");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    cards: Vec<CardRef>,
    index: FxHashMap<CardId, usize>,
}

impl CardCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in 32-card pool.
    #[must_use]
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for (id, name, [members, albums, debut_year, fame, awards]) in STANDARD_POOL {
            catalog.register(Card::new(
                id,
                name,
                CardStats {
                    members,
                    albums,
                    debut_year,
                    fame,
                    awards,
                },
            ));
        }
        catalog
    }

    /// Register a card.
    ///
    /// Panics if a card with the same ID already exists or if the card is
    /// the hidden-card placeholder.
    pub fn register(&mut self, card: Card) {
        assert!(!card.is_placeholder(), "placeholder cards cannot be dealt");
        if self.index.contains_key(&card.id) {
            panic!("Card with ID {:?} already registered", card.id);
        }
        self.index.insert(card.id.clone(), self.cards.len());
        self.cards.push(card.into_ref());
    }

    /// Get a card by ID.
    #[must_use]
    pub fn get(&self, id: &CardId) -> Option<&CardRef> {
        self.index.get(id).map(|&i| &self.cards[i])
    }

    /// Check if a card is registered.
    #[must_use]
    pub fn contains(&self, id: &CardId) -> bool {
        self.index.contains_key(id)
    }

    /// Number of cards in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over cards in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CardRef> {
        self.cards.iter()
    }

    /// Shared handles to every card, in registration order.
    #[must_use]
    pub fn pool(&self) -> Vec<CardRef> {
        self.cards.clone()
    }
}
