//! Round engine.
//!
//! Compares two cards on one attribute. Pure and total: the same inputs
//! always give the same outcome, and nothing outside the arguments is read.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::cards::{Attribute, Card};
use crate::core::Side;

/// Result of comparing one attribute between card A and card B.
///
/// Inside a session, A is always the local `Side::Player` card and B the
/// `Side::Opponent` card. On the wire, A is the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "WIN_A")]
    WinA,
    #[serde(rename = "WIN_B")]
    WinB,
    #[serde(rename = "DRAW")]
    Draw,
}

impl Outcome {
    /// The side that won, if any.
    #[must_use]
    pub const fn winner(self) -> Option<Side> {
        match self {
            Outcome::WinA => Some(Side::Player),
            Outcome::WinB => Some(Side::Opponent),
            Outcome::Draw => None,
        }
    }

    /// Swap the roles of A and B.
    #[must_use]
    pub const fn invert(self) -> Self {
        match self {
            Outcome::WinA => Outcome::WinB,
            Outcome::WinB => Outcome::WinA,
            Outcome::Draw => Outcome::Draw,
        }
    }

    /// Re-read a host-perspective outcome (A = host) as the guest sees it
    /// (A = guest). A host win is a guest loss and vice versa.
    #[must_use]
    pub const fn to_guest_perspective(self) -> Self {
        self.invert()
    }

    /// Re-read a guest-perspective outcome as the host sees it.
    #[must_use]
    pub const fn to_host_perspective(self) -> Self {
        self.invert()
    }

    /// Outcome in which `side` wins.
    #[must_use]
    pub const fn win_for(side: Side) -> Self {
        match side {
            Side::Player => Outcome::WinA,
            Side::Opponent => Outcome::WinB,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::WinA => write!(f, "WIN_A"),
            Outcome::WinB => write!(f, "WIN_B"),
            Outcome::Draw => write!(f, "DRAW"),
        }
    }
}

/// Resolve a round between `a` and `b` on `attribute`.
///
/// Higher wins on every attribute except `DebutYear`, where the earlier
/// (lower) year wins. Equal values are always a draw.
///
/// ```
/// use rust_trumps::cards::{Attribute, Card, CardStats};
/// use rust_trumps::rules::{resolve_round, Outcome};
///
/// let bts = Card::new("1", "BTS", CardStats { members: 7, debut_year: 2013, ..Default::default() });
/// let bp = Card::new("2", "BLACKPINK", CardStats { members: 4, debut_year: 2016, ..Default::default() });
///
/// assert_eq!(resolve_round(&bts, &bp, Attribute::Members), Outcome::WinA);
/// assert_eq!(resolve_round(&bts, &bp, Attribute::DebutYear), Outcome::WinA);
/// assert_eq!(resolve_round(&bp, &bts, Attribute::DebutYear), Outcome::WinB);
/// ```
#[must_use]
pub fn resolve_round(a: &Card, b: &Card, attribute: Attribute) -> Outcome {
    match attribute.rank(a.stat(attribute), b.stat(attribute)) {
        Ordering::Greater => Outcome::WinA,
        Ordering::Less => Outcome::WinB,
        Ordering::Equal => Outcome::Draw,
    }
}
