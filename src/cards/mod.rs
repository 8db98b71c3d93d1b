//! Card system: attributes, card records, and the card pool.
//!
//! ## Key Types
//!
//! - `Attribute`: One of the five comparable stats
//! - `CardStats`: The stat block every card carries
//! - `Card` / `CardRef`: Immutable card record and its shared handle
//! - `CardCatalog`: The pool a game is dealt from

pub mod attributes;
pub mod definition;
pub mod catalog;

pub use attributes::{Attribute, CardStats, Preference};
pub use definition::{Card, CardId, CardRef, PLACEHOLDER_ID};
pub use catalog::CardCatalog;
