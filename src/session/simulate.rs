//! Headless full-match simulation.
//!
//! Drives a single-player session to completion with one policy per side.
//! Used by tests to check termination and by the benchmark.

use serde::{Deserialize, Serialize};

use crate::cards::CardCatalog;
use crate::core::{ConfigError, GameRng, SessionConfig, Side, SideMap};
use crate::policy::AttributePolicy;

use super::machine::{GameEnd, Session};
use super::state::{GameMode, GameState};

/// How a simulated match ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// `None` if the round cap was hit first.
    pub winner: Option<Side>,
    pub rounds: u32,
    pub rounds_won: SideMap<u32>,
    pub draws: u32,
    pub final_sizes: SideMap<usize>,
}

impl MatchSummary {
    /// Whether the match reached `GAME_OVER` within the cap.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.winner.is_some()
    }
}

/// Play one match to completion or until `max_rounds` rounds are resolved.
///
/// The player side's policy draws from its own RNG stream derived from the
/// session seed, so two runs with the same config and policies are
/// identical.
pub fn simulate_match(
    config: SessionConfig,
    player: &mut dyn AttributePolicy,
    opponent: &mut dyn AttributePolicy,
    max_rounds: u32,
) -> Result<MatchSummary, ConfigError> {
    let mut player_rng = match config.seed {
        Some(seed) => GameRng::new(seed).for_context("player"),
        None => GameRng::from_entropy(),
    };
    let mut session = Session::started(config, CardCatalog::standard(), GameMode::SinglePlayer)?;

    let mut draws = 0;
    while session.state() == GameState::Playing && session.round_number() < max_rounds {
        let resolved = match session.turn() {
            Side::Player => {
                let Some(card) = session.active_card(Side::Player).cloned() else {
                    break;
                };
                let attribute = player.choose(&card, &mut player_rng);
                session.select_attribute(Side::Player, attribute).map(|r| r.outcome)
            }
            Side::Opponent => session.play_cpu_turn(opponent).map(|r| r.outcome),
        };
        match resolved {
            Ok(outcome) if outcome.winner().is_none() => draws += 1,
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(%err, "simulation stalled");
                break;
            }
        }
        if let Err(err) = session.advance() {
            tracing::warn!(%err, "simulation stalled");
            break;
        }
    }

    let winner = match session.end() {
        Some(GameEnd::Won(side)) => Some(side),
        _ => None,
    };
    tracing::debug!(?winner, rounds = session.round_number(), "simulation finished");

    Ok(MatchSummary {
        winner,
        rounds: session.round_number(),
        rounds_won: SideMap::new(|side| session.rounds_won(side)),
        draws,
        final_sizes: SideMap::new(|side| session.score(side)),
    })
}
