//! Comparison attributes and per-card stat blocks.
//!
//! Every card carries the same five numeric stats. Four of them are
//! "higher wins"; `DebutYear` is "lower wins" (an earlier debut beats a
//! later one).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A numeric card field that a round can be played on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    Members,
    Albums,
    DebutYear,
    Fame,
    Awards,
}

/// Which direction of a comparison wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preference {
    Higher,
    Lower,
}

impl Attribute {
    /// All attributes in display order.
    pub const ALL: [Attribute; 5] = [
        Attribute::Members,
        Attribute::Albums,
        Attribute::DebutYear,
        Attribute::Fame,
        Attribute::Awards,
    ];

    /// Whether the higher or the lower value wins on this attribute.
    #[must_use]
    pub const fn preference(self) -> Preference {
        match self {
            Attribute::DebutYear => Preference::Lower,
            _ => Preference::Higher,
        }
    }

    /// Stable wire/config key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Attribute::Members => "members",
            Attribute::Albums => "albums",
            Attribute::DebutYear => "debutYear",
            Attribute::Fame => "fame",
            Attribute::Awards => "awards",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Attribute::Members => "Members",
            Attribute::Albums => "Albums",
            Attribute::DebutYear => "Debut",
            Attribute::Fame => "Fame",
            Attribute::Awards => "Awards",
        }
    }

    /// Parse a key produced by [`Attribute::key`].
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.key() == key)
    }

    /// Order two values so that `Greater` means `a` beats `b`.
    #[must_use]
    pub fn rank(self, a: u32, b: u32) -> Ordering {
        match self.preference() {
            Preference::Higher => a.cmp(&b),
            Preference::Lower => b.cmp(&a),
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The fixed stat block of a card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardStats {
    pub members: u32,
    pub albums: u32,
    pub debut_year: u32,
    /// Popularity score, 1 to 40.
    pub fame: u32,
    pub awards: u32,
}

impl CardStats {
    /// Read one attribute.
    #[must_use]
    pub const fn get(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Members => self.members,
            Attribute::Albums => self.albums,
            Attribute::DebutYear => self.debut_year,
            Attribute::Fame => self.fame,
            Attribute::Awards => self.awards,
        }
    }
}
