//! Deck storage.
//!
//! A `Deck` is an ordered sequence of shared cards owned by one side.
//! Card movement between decks is decided by `rules::redistribute`.

pub mod ordered;

pub use ordered::Deck;
