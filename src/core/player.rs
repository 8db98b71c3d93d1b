//! Party identification and per-party data storage.
//!
//! ## Side
//!
//! A seat relative to the local process: `Player` is whoever runs this
//! session (the host on the host, the guest on the guest, player one in
//! pass-and-play), `Opponent` is the other seat.
//!
//! ## Role
//!
//! The online role of the local process. Only meaningful in online modes.
//!
//! ## SideMap
//!
//! Fixed two-slot storage indexed by `Side`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two seats at the table, seen from the local process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The local party ("A" in round outcomes).
    Player,
    /// The remote or second party ("B" in round outcomes).
    Opponent,
}

impl Side {
    /// Both sides, player first.
    pub const BOTH: [Side; 2] = [Side::Player, Side::Opponent];

    /// The other seat.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Player => write!(f, "Player"),
            Side::Opponent => write!(f, "Opponent"),
        }
    }
}

/// Online role of the local process.
///
/// The host holds both authoritative decks and resolves every round;
/// the guest only ever sees its own deck plus the cards the host reveals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Host,
    Guest,
}

impl Role {
    /// Which local side this role occupies from the host's point of view.
    ///
    /// The host's `Player` side is the host; its `Opponent` side is the guest.
    #[must_use]
    pub const fn host_side(self) -> Side {
        match self {
            Role::Host => Side::Player,
            Role::Guest => Side::Opponent,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Host => write!(f, "host"),
            Role::Guest => write!(f, "guest"),
        }
    }
}

/// Per-side data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use rust_trumps::core::{Side, SideMap};
///
/// let mut won: SideMap<u32> = SideMap::with_value(0);
/// won[Side::Opponent] += 1;
///
/// assert_eq!(won[Side::Player], 0);
/// assert_eq!(won[Side::Opponent], 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideMap<T> {
    player: T,
    opponent: T,
}

impl<T> SideMap<T> {
    /// Create a map with values from a factory function.
    pub fn new(factory: impl Fn(Side) -> T) -> Self {
        Self {
            player: factory(Side::Player),
            opponent: factory(Side::Opponent),
        }
    }

    /// Create a map from explicit values.
    pub fn from_pair(player: T, opponent: T) -> Self {
        Self { player, opponent }
    }

    /// Create a map with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            player: value.clone(),
            opponent: value,
        }
    }

    /// Get a reference to a side's data.
    #[must_use]
    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    /// Get a mutable reference to a side's data.
    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }

    /// Iterate over (Side, &T) pairs, player first.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        [(Side::Player, &self.player), (Side::Opponent, &self.opponent)].into_iter()
    }

    /// Swap the two entries. Used when re-reading a host-side view as the guest.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.player, &mut self.opponent);
    }
}

impl<T> Index<Side> for SideMap<T> {
    type Output = T;

    fn index(&self, side: Side) -> &Self::Output {
        self.get(side)
    }
}

impl<T> IndexMut<Side> for SideMap<T> {
    fn index_mut(&mut self, side: Side) -> &mut Self::Output {
        self.get_mut(side)
    }
}
