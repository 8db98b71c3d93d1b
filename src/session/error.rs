//! Session guard failures.
//!
//! An `InvalidAction` means "this request does not apply right now". The
//! session is left untouched; callers at the event edge log and drop it.

use crate::core::Side;

use super::state::{GameMode, GameState};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAction {
    #[error("not allowed in state {0}")]
    WrongState(GameState),
    #[error("not allowed in mode {0:?}")]
    WrongMode(GameMode),
    #[error("it is not {0}'s turn")]
    NotYourTurn(Side),
    #[error("{0} has no active card")]
    NoActiveCard(Side),
    #[error("the guest never resolves rounds itself")]
    NotAuthoritative,
    #[error("a move is already waiting for the host")]
    MoveInFlight,
    #[error("no open connection")]
    NotConnected,
    #[error("malformed deal: {0}")]
    MalformedDeal(String),
}
