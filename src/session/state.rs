//! Session lifecycle states and play modes.

use serde::{Deserialize, Serialize};

use crate::core::Role;

/// Where a session is in its lifecycle.
///
/// ```text
/// START ──start──▶ LOBBY ──both ready──▶ PLAYING ◀──acknowledge── WAITING_NEXT_TURN
///   │                                     │  ▲                          ▲
///   └──────start (local)─────────────────▶│  └─────advance──┐           │
///                                        select             │           │
///                                         ▼                 │           │
///                                       RESULT ──advance────┴───────────┘
///                                         │
///                                         └──advance (deck empty)──▶ GAME_OVER
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    /// Idle, no game.
    Start,
    /// Online only: connection and readiness handshake.
    Lobby,
    /// Waiting for the turn holder to pick an attribute.
    Playing,
    /// Round outcome shown, waiting for an explicit advance.
    Result,
    /// Pass-and-play privacy gate before the next player's card is shown.
    WaitingNextTurn,
    /// Terminal: one deck is empty or the opponent left.
    GameOver,
}

impl GameState {
    /// States in which a game is underway and a disconnect is fatal.
    #[must_use]
    pub const fn is_in_game(self) -> bool {
        matches!(
            self,
            GameState::Playing | GameState::Result | GameState::WaitingNextTurn
        )
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GameState::Start => "START",
            GameState::Lobby => "LOBBY",
            GameState::Playing => "PLAYING",
            GameState::Result => "RESULT",
            GameState::WaitingNextTurn => "WAITING_NEXT_TURN",
            GameState::GameOver => "GAME_OVER",
        };
        f.write_str(name)
    }
}

/// How the two seats are filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameMode {
    /// Local player against a CPU policy.
    SinglePlayer,
    /// Two people sharing one device.
    TwoPlayersLocal,
    /// This process deals and resolves every round.
    OnlineHost,
    /// This process follows the host's results.
    OnlineGuest,
}

impl GameMode {
    /// Whether the opponent is a remote process.
    #[must_use]
    pub const fn is_online(self) -> bool {
        matches!(self, GameMode::OnlineHost | GameMode::OnlineGuest)
    }

    /// Online role, if any.
    #[must_use]
    pub const fn role(self) -> Option<Role> {
        match self {
            GameMode::OnlineHost => Some(Role::Host),
            GameMode::OnlineGuest => Some(Role::Guest),
            _ => None,
        }
    }

    /// The online mode for `role`.
    #[must_use]
    pub const fn online(role: Role) -> Self {
        match role {
            Role::Host => GameMode::OnlineHost,
            Role::Guest => GameMode::OnlineGuest,
        }
    }
}
