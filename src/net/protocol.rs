//! Host/guest wire protocol.
//!
//! One variant per message tag. Every consumer matches exhaustively, so a
//! new tag is a compile error until it is handled everywhere.

use serde::{Deserialize, Serialize};

use crate::cards::{Attribute, CardRef};
use crate::rules::Outcome;

/// A message exchanged over the data channel.
///
/// Encoding is bincode in byte transports (see [`super::wire`]) or any
/// serde format on structured channels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkMessage {
    /// The sender pressed "ready" in the lobby.
    Ready,
    /// Host's authoritative deal. `deck` is the receiver's own deck, top first.
    StartGame { deck: Vec<CardRef> },
    /// Guest asks the host to resolve a round on `attribute`.
    GuestMove { attribute: Attribute },
    /// Authoritative outcome of a round. `outcome` is host perspective
    /// (`WinA` means the host won).
    RoundResult {
        attribute: Attribute,
        outcome: Outcome,
        #[serde(rename = "hostCard")]
        host_card: CardRef,
        #[serde(rename = "guestCard")]
        guest_card: CardRef,
    },
    /// The sender advanced past the result of `round`.
    NextRound { round: u32 },
    /// Rematch request. From the host it announces an imminent re-deal.
    Restart,
}

impl NetworkMessage {
    /// The message tag.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            NetworkMessage::Ready => "READY",
            NetworkMessage::StartGame { .. } => "START_GAME",
            NetworkMessage::GuestMove { .. } => "GUEST_MOVE",
            NetworkMessage::RoundResult { .. } => "ROUND_RESULT",
            NetworkMessage::NextRound { .. } => "NEXT_ROUND",
            NetworkMessage::Restart => "RESTART",
        }
    }
}

impl std::fmt::Display for NetworkMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
