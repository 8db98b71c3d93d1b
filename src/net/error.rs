//! Network error taxonomy.
//!
//! None of these are raised to the user as failures: the synchronizer
//! records them as `last_error` and surfaces a [`super::Notice`].

use crate::core::Role;
use crate::session::{GameState, InvalidAction};

use super::wire::FrameDecodeError;

/// Signaling or channel-level failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// The requested peer id is unknown to the signaling service.
    #[error("peer {0} is unavailable")]
    PeerUnavailable(String),
    #[error("network failure: {0}")]
    Network(String),
    #[error("lost the signaling server")]
    SignalingDisconnected,
    #[error("data channel error: {0}")]
    Channel(String),
    /// Send attempted on a connection that is already closed.
    #[error("connection closed")]
    Closed,
}

/// A malformed or out-of-sequence message. Always ignored.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("{message} is not expected by the {role} in {state}")]
    Unexpected {
        message: &'static str,
        role: Role,
        state: GameState,
    },
    #[error("{message} rejected: {source}")]
    Rejected {
        message: &'static str,
        #[source]
        source: InvalidAction,
    },
    #[error("NEXT_ROUND for round {got} but the latest round is {latest}")]
    RoundAhead { got: u32, latest: u32 },
    #[error("undecodable frame: {0}")]
    Frame(#[from] FrameDecodeError),
}

/// Everything the synchronizer can record as its last error.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("connect attempt timed out after {ticks} ticks")]
    Timeout { ticks: u64 },
    #[error("opponent disconnected mid-game")]
    MidGameDisconnect,
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
