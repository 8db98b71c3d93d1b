//! Session state machine.
//!
//! `Session` owns both decks and the turn, and composes the round engine,
//! redistribution rule, and turn allocator across one game. It performs no
//! I/O: local input and the network synchronizer both drive it through the
//! same methods, and every guard failure comes back as `InvalidAction`
//! with the session unchanged.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::cards::{Attribute, CardCatalog, CardRef};
use crate::core::{ConfigError, GameRng, Side, SideMap, SessionConfig};
use crate::deck::Deck;
use crate::policy::AttributePolicy;
use crate::rules::{next_turn, redistribute, resolve_round, Outcome, Transfer};

use super::error::InvalidAction;
use super::state::{GameMode, GameState};

/// One resolved round, as shown in `RESULT`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundRecord {
    /// 1-based round number within the game.
    pub number: u32,
    /// Side that chose the attribute.
    pub chooser: Side,
    pub attribute: Attribute,
    /// Local perspective: A is `Side::Player`.
    pub outcome: Outcome,
    /// The two revealed cards.
    pub cards: SideMap<CardRef>,
}

/// Why the game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEnd {
    /// The other side's deck ran out.
    Won(Side),
    /// The remote party disconnected mid-game.
    OpponentLeft,
}

/// What happened when a result was advanced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    /// Play continues; `turn` picks next.
    NextRound { turn: Side, transfer: Transfer },
    /// Pass-and-play: hand the device to `to` before revealing its card.
    PassDevice { to: Side, transfer: Transfer },
    /// A deck emptied.
    GameOver { end: GameEnd, transfer: Transfer },
}

impl Advance {
    /// The card movement this advance applied.
    #[must_use]
    pub fn transfer(&self) -> &Transfer {
        match self {
            Advance::NextRound { transfer, .. }
            | Advance::PassDevice { transfer, .. }
            | Advance::GameOver { transfer, .. } => transfer,
        }
    }
}

/// The mutable root of one game.
///
/// ## Local play
///
/// ```
/// use rust_trumps::cards::Attribute;
/// use rust_trumps::core::{SessionConfig, Side};
/// use rust_trumps::session::{GameMode, GameState, Session};
///
/// let mut session = Session::new(SessionConfig::new().with_seed(7)).unwrap();
/// session.start(GameMode::SinglePlayer).unwrap();
/// assert_eq!(session.state(), GameState::Playing);
/// assert_eq!(session.turn(), Side::Player);
///
/// session.select_attribute(Side::Player, Attribute::Fame).unwrap();
/// assert_eq!(session.state(), GameState::Result);
///
/// session.advance().unwrap();
/// assert_eq!(session.deck(Side::Player).len() + session.deck(Side::Opponent).len(), 32);
/// ```
#[derive(Clone, Debug)]
pub struct Session {
    config: SessionConfig,
    catalog: CardCatalog,
    rng: GameRng,
    cpu_rng: GameRng,

    state: GameState,
    mode: GameMode,
    decks: SideMap<Deck>,
    turn: Side,
    selected_attribute: Option<Attribute>,
    last_outcome: Option<Outcome>,
    pending: Option<RoundRecord>,
    round_number: u32,
    rounds_won: SideMap<u32>,
    total_cards: usize,
    end: Option<GameEnd>,
}

impl Session {
    /// Create an idle session over the standard card pool.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        Self::with_catalog(config, CardCatalog::standard())
    }

    /// Create a session that has already left `START` for `mode`.
    ///
    /// Online modes wait in `LOBBY`; local modes are dealt and `PLAYING`.
    pub fn started(
        config: SessionConfig,
        catalog: CardCatalog,
        mode: GameMode,
    ) -> Result<Self, ConfigError> {
        let mut session = Self::with_catalog(config, catalog)?;
        session.enter(mode);
        Ok(session)
    }

    /// Create an idle session over a custom card pool.
    pub fn with_catalog(config: SessionConfig, catalog: CardCatalog) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.total_cards() > catalog.len() {
            return Err(ConfigError::Invalid(format!(
                "deck_size {} needs {} cards but the pool has {}",
                config.deck_size,
                config.total_cards(),
                catalog.len()
            )));
        }

        let rng = match config.seed {
            Some(seed) => GameRng::new(seed),
            None => GameRng::from_entropy(),
        };
        let cpu_rng = rng.for_context("cpu");

        Ok(Self {
            total_cards: config.total_cards(),
            config,
            catalog,
            rng,
            cpu_rng,
            state: GameState::Start,
            mode: GameMode::SinglePlayer,
            decks: SideMap::new(Deck::new),
            turn: Side::Player,
            selected_attribute: None,
            last_outcome: None,
            pending: None,
            round_number: 0,
            rounds_won: SideMap::default(),
            end: None,
        })
    }

    // === Accessors ===

    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Side entitled to choose the attribute for the current round.
    #[must_use]
    pub fn turn(&self) -> Side {
        self.turn
    }

    #[must_use]
    pub fn deck(&self, side: Side) -> &Deck {
        &self.decks[side]
    }

    /// Deck size, which is also the score.
    #[must_use]
    pub fn score(&self, side: Side) -> usize {
        self.decks[side].len()
    }

    /// Cards in both decks. Constant for the life of a game.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.decks[Side::Player].len() + self.decks[Side::Opponent].len()
    }

    /// Cards dealt at the start of the current game.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.total_cards
    }

    /// The card a side is playing this round.
    ///
    /// In `RESULT` this is the revealed card; otherwise it is the deck top.
    #[must_use]
    pub fn active_card(&self, side: Side) -> Option<&CardRef> {
        match &self.pending {
            Some(round) => Some(&round.cards[side]),
            None => self.decks[side].peek_top(),
        }
    }

    #[must_use]
    pub fn selected_attribute(&self) -> Option<Attribute> {
        self.selected_attribute
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    /// The round on display while in `RESULT`.
    #[must_use]
    pub fn pending_round(&self) -> Option<&RoundRecord> {
        self.pending.as_ref()
    }

    /// Rounds resolved so far in this game.
    #[must_use]
    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    #[must_use]
    pub fn rounds_won(&self, side: Side) -> u32 {
        self.rounds_won[side]
    }

    #[must_use]
    pub fn end(&self) -> Option<GameEnd> {
        self.end
    }

    /// The side that won by emptying the other deck.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        match self.end {
            Some(GameEnd::Won(side)) => Some(side),
            _ => None,
        }
    }

    /// In pass-and-play, the seat the device should be handed to.
    #[must_use]
    pub fn awaiting_pass_to(&self) -> Option<Side> {
        (self.state == GameState::WaitingNextTurn).then_some(self.turn)
    }

    // === Lifecycle ===

    /// Leave `START` for a new game in `mode`.
    ///
    /// Online modes go to `LOBBY` without dealing; the host deals once both
    /// parties are ready. Local modes deal immediately.
    pub fn start(&mut self, mode: GameMode) -> Result<(), InvalidAction> {
        self.require_state(GameState::Start)?;
        self.enter(mode);
        Ok(())
    }

    /// Leave `START` for a local game with fixed decks instead of a shuffle.
    ///
    /// Decks are listed top first. Used for replays and scripted scenarios.
    pub fn start_with_decks(
        &mut self,
        mode: GameMode,
        player: Vec<CardRef>,
        opponent: Vec<CardRef>,
    ) -> Result<(), InvalidAction> {
        if mode.is_online() {
            return Err(InvalidAction::WrongMode(mode));
        }
        self.require_state(GameState::Start)?;
        let both: Vec<CardRef> = player.iter().chain(&opponent).cloned().collect();
        validate_deal(&both)?;
        if player.is_empty() || opponent.is_empty() {
            return Err(InvalidAction::MalformedDeal("both decks need cards".into()));
        }

        self.mode = mode;
        self.begin_game(player, opponent, Side::Player);
        self.enter_first_turn();
        Ok(())
    }

    /// Re-deal a finished local game in the same mode.
    pub fn rematch(&mut self) -> Result<(), InvalidAction> {
        if self.mode.is_online() {
            return Err(InvalidAction::WrongMode(self.mode));
        }
        self.require_state(GameState::GameOver)?;
        self.deal_local();
        Ok(())
    }

    /// Return to `START`, discarding the game.
    pub fn reset(&mut self) {
        self.clear_game();
        self.decks = SideMap::new(Deck::new);
        self.state = GameState::Start;
        tracing::debug!("session reset");
    }

    /// Host: deal the authoritative decks and enter `PLAYING`.
    ///
    /// Allowed from `LOBBY` (first game) or `GAME_OVER` (rematch). Returns
    /// the guest's deck, top first, for transmission.
    pub fn host_deal(&mut self) -> Result<Vec<CardRef>, InvalidAction> {
        self.require_mode(GameMode::OnlineHost)?;
        if !matches!(self.state, GameState::Lobby | GameState::GameOver) {
            return Err(InvalidAction::WrongState(self.state));
        }

        let (host, guest) = self.shuffled_halves();
        self.begin_game(host, guest.clone(), Side::Player);
        self.state = GameState::Playing;
        tracing::info!(cards = self.total_cards, "host dealt");
        Ok(guest)
    }

    /// Guest: take the host's deal as this party's own deck.
    ///
    /// The host's deck is unseen; it is represented by same-length
    /// placeholders that are never compared. The host leads the first round.
    pub fn accept_deal(&mut self, deck: Vec<CardRef>) -> Result<(), InvalidAction> {
        self.require_mode(GameMode::OnlineGuest)?;
        if !matches!(self.state, GameState::Lobby | GameState::GameOver) {
            return Err(InvalidAction::WrongState(self.state));
        }
        validate_deal(&deck)?;

        let hidden = Deck::placeholders(Side::Opponent, deck.len());
        self.clear_game();
        self.total_cards = deck.len() * 2;
        self.decks = SideMap::from_pair(Deck::from_cards(Side::Player, deck), hidden);
        self.turn = Side::Opponent;
        self.state = GameState::Playing;
        tracing::info!(cards = self.total_cards, "guest accepted deal");
        Ok(())
    }

    // === Rounds ===

    /// The turn holder picks `attribute`; resolve the round and show it.
    ///
    /// Rejected for the guest, whose rounds are resolved by the host.
    pub fn select_attribute(
        &mut self,
        by: Side,
        attribute: Attribute,
    ) -> Result<&RoundRecord, InvalidAction> {
        if self.mode == GameMode::OnlineGuest {
            return Err(InvalidAction::NotAuthoritative);
        }
        self.require_state(GameState::Playing)?;
        if by != self.turn {
            return Err(InvalidAction::NotYourTurn(by));
        }
        let cards = self.active_pair()?;
        let outcome = resolve_round(&cards[Side::Player], &cards[Side::Opponent], attribute);
        Ok(self.show_round(attribute, outcome, cards))
    }

    /// Single player: let the CPU take its turn with `policy`.
    pub fn play_cpu_turn(
        &mut self,
        policy: &mut dyn AttributePolicy,
    ) -> Result<&RoundRecord, InvalidAction> {
        self.require_mode(GameMode::SinglePlayer)?;
        self.require_state(GameState::Playing)?;
        if self.turn != Side::Opponent {
            return Err(InvalidAction::NotYourTurn(Side::Opponent));
        }
        let card = self
            .decks[Side::Opponent]
            .peek_top()
            .cloned()
            .ok_or(InvalidAction::NoActiveCard(Side::Opponent))?;
        let attribute = policy.choose(&card, &mut self.cpu_rng);
        tracing::debug!(%attribute, card = %card.name, "cpu chose");
        self.select_attribute(Side::Opponent, attribute)
    }

    /// Guest: show a round the host resolved.
    ///
    /// `outcome` must already be in local (guest) perspective. The revealed
    /// cards are taken as given; the guest never compares them itself.
    pub fn apply_remote_result(
        &mut self,
        attribute: Attribute,
        outcome: Outcome,
        cards: SideMap<CardRef>,
    ) -> Result<&RoundRecord, InvalidAction> {
        self.require_mode(GameMode::OnlineGuest)?;
        self.require_state(GameState::Playing)?;
        if self.decks[Side::Player].is_empty() {
            return Err(InvalidAction::NoActiveCard(Side::Player));
        }
        if let Some(own) = self.decks[Side::Player].peek_top() {
            if own.id != cards[Side::Player].id {
                tracing::warn!(
                    expected = %own.id,
                    revealed = %cards[Side::Player].id,
                    "host revealed a different card for the guest; trusting host"
                );
            }
        }
        Ok(self.show_round(attribute, outcome, cards))
    }

    /// Leave `RESULT`: move cards, pick the next turn, and detect game end.
    pub fn advance(&mut self) -> Result<Advance, InvalidAction> {
        self.require_state(GameState::Result)?;
        let round = self
            .pending
            .take()
            .ok_or(InvalidAction::WrongState(self.state))?;

        let transfer = redistribute(&mut self.decks, &round.cards, round.outcome);
        self.turn = next_turn(round.outcome, round.chooser);
        self.selected_attribute = None;

        let emptied = Side::BOTH.into_iter().find(|&s| self.decks[s].is_empty());
        if let Some(loser) = emptied {
            let end = GameEnd::Won(loser.other());
            self.end = Some(end);
            self.state = GameState::GameOver;
            tracing::info!(winner = %loser.other(), rounds = self.round_number, "game over");
            return Ok(Advance::GameOver { end, transfer });
        }

        if self.mode == GameMode::TwoPlayersLocal {
            self.state = GameState::WaitingNextTurn;
            Ok(Advance::PassDevice {
                to: self.turn,
                transfer,
            })
        } else {
            self.state = GameState::Playing;
            Ok(Advance::NextRound {
                turn: self.turn,
                transfer,
            })
        }
    }

    /// Pass-and-play: the next player has the device; reveal their card.
    pub fn acknowledge(&mut self) -> Result<Side, InvalidAction> {
        self.require_state(GameState::WaitingNextTurn)?;
        self.state = GameState::Playing;
        Ok(self.turn)
    }

    /// Online: the channel closed. Fatal mid-game, ignored otherwise.
    ///
    /// Returns whether the session moved to `GAME_OVER`.
    pub fn opponent_disconnected(&mut self) -> bool {
        if !self.mode.is_online() || !self.state.is_in_game() {
            return false;
        }
        self.pending = None;
        self.end = Some(GameEnd::OpponentLeft);
        self.state = GameState::GameOver;
        tracing::info!("opponent left mid-game");
        true
    }

    // === Internals ===

    fn enter(&mut self, mode: GameMode) {
        self.mode = mode;
        if mode.is_online() {
            self.state = GameState::Lobby;
            tracing::debug!(?mode, "session entered lobby");
        } else {
            self.deal_local();
        }
    }

    fn require_state(&self, expected: GameState) -> Result<(), InvalidAction> {
        if self.state == expected {
            Ok(())
        } else {
            Err(InvalidAction::WrongState(self.state))
        }
    }

    fn require_mode(&self, expected: GameMode) -> Result<(), InvalidAction> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(InvalidAction::WrongMode(self.mode))
        }
    }

    fn active_pair(&self) -> Result<SideMap<CardRef>, InvalidAction> {
        let player = self.decks[Side::Player]
            .peek_top()
            .ok_or(InvalidAction::NoActiveCard(Side::Player))?;
        let opponent = self.decks[Side::Opponent]
            .peek_top()
            .ok_or(InvalidAction::NoActiveCard(Side::Opponent))?;
        Ok(SideMap::from_pair(player.clone(), opponent.clone()))
    }

    fn show_round(
        &mut self,
        attribute: Attribute,
        outcome: Outcome,
        cards: SideMap<CardRef>,
    ) -> &RoundRecord {
        self.round_number += 1;
        if let Some(winner) = outcome.winner() {
            self.rounds_won[winner] += 1;
        }
        self.selected_attribute = Some(attribute);
        self.last_outcome = Some(outcome);
        self.state = GameState::Result;
        tracing::debug!(
            round = self.round_number,
            chooser = %self.turn,
            %attribute,
            %outcome,
            "round resolved"
        );
        self.pending.insert(RoundRecord {
            number: self.round_number,
            chooser: self.turn,
            attribute,
            outcome,
            cards,
        })
    }

    fn shuffled_halves(&mut self) -> (Vec<CardRef>, Vec<CardRef>) {
        let mut pool = self.catalog.pool();
        self.rng.shuffle(&mut pool);
        pool.truncate(self.config.total_cards());
        let second = pool.split_off(self.config.deck_size);
        (pool, second)
    }

    fn deal_local(&mut self) {
        let (player, opponent) = self.shuffled_halves();
        self.begin_game(player, opponent, Side::Player);
        self.enter_first_turn();
    }

    fn enter_first_turn(&mut self) {
        self.state = match self.mode {
            GameMode::TwoPlayersLocal => GameState::WaitingNextTurn,
            _ => GameState::Playing,
        };
        tracing::info!(mode = ?self.mode, cards = self.total_cards, "local game dealt");
    }

    fn begin_game(&mut self, player: Vec<CardRef>, opponent: Vec<CardRef>, first: Side) {
        self.clear_game();
        self.total_cards = player.len() + opponent.len();
        self.decks = SideMap::from_pair(
            Deck::from_cards(Side::Player, player),
            Deck::from_cards(Side::Opponent, opponent),
        );
        self.turn = first;
    }

    fn clear_game(&mut self) {
        self.selected_attribute = None;
        self.last_outcome = None;
        self.pending = None;
        self.round_number = 0;
        self.rounds_won = SideMap::default();
        self.end = None;
        self.turn = Side::Player;
    }
}

/// A deal must be non-empty, contain real cards only, and have unique ids.
fn validate_deal(deck: &[CardRef]) -> Result<(), InvalidAction> {
    if deck.is_empty() {
        return Err(InvalidAction::MalformedDeal("empty deck".into()));
    }
    let mut seen = FxHashSet::default();
    for card in deck {
        if card.is_placeholder() {
            return Err(InvalidAction::MalformedDeal("placeholder card dealt".into()));
        }
        if !seen.insert(&card.id) {
            return Err(InvalidAction::MalformedDeal(format!("duplicate {}", card.id)));
        }
    }
    Ok(())
}
