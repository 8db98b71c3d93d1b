//! Host-authoritative session synchronizer.
//!
//! Each party runs one `NetworkSynchronizer`. It exclusively owns the local
//! `Session` and the single active connection. The embedding forwards
//! every event (connection lifecycle, received data, user input, timer
//! ticks) to it; handlers run one at a time against the live session.
//!
//! The host deals both decks and resolves every round, then broadcasts
//! `ROUND_RESULT`. The guest never compares cards: it sends `GUEST_MOVE`
//! on its turn and applies the host's result with the outcome re-read from
//! its own perspective.
//!
//! Advancing past `RESULT` is mirrored with `NEXT_ROUND { round }`. A
//! party that receives it while still showing that round advances too;
//! one that already advanced ignores it. Each round is therefore advanced
//! exactly once on both sides whoever clicks first.

use std::collections::VecDeque;

use crate::cards::{Attribute, CardCatalog, CardRef};
use crate::core::{ConfigError, Role, SessionConfig, Side, SideMap};
use crate::rules::Outcome;
use crate::session::{Advance, GameEnd, GameMode, GameState, InvalidAction, Session};

use super::connection::Connection;
use super::error::{ConnectionError, ProtocolError, SyncError};
use super::protocol::NetworkMessage;
use super::wire::FrameReader;

/// Link status shown in the lobby.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    Idle,
    Connecting,
    Connected,
    Error,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Idle => write!(f, "idle"),
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Error => write!(f, "error"),
        }
    }
}

/// Transient status message for the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// The signaling service issued our id; the host shares it out of band.
    IdIssued(String),
    Connected { peer: String },
    ConnectFailed(ConnectionError),
    TimedOut,
    /// Channel closed before the game started. Retry is possible.
    LobbyConnectionLost,
    PeerReady,
    GameStarted,
    WaitingForHost,
    OpponentLeft,
    RematchRequested,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::IdIssued(id) => write!(f, "Your code: {id}"),
            Notice::Connected { peer } => write!(f, "Connected to {peer}"),
            Notice::ConnectFailed(err) => write!(f, "Connection failed: {err}"),
            Notice::TimedOut => write!(f, "Connection timed out"),
            Notice::LobbyConnectionLost => write!(f, "Connection lost, try again"),
            Notice::PeerReady => write!(f, "Opponent is ready"),
            Notice::GameStarted => write!(f, "Game started"),
            Notice::WaitingForHost => write!(f, "Waiting for the host"),
            Notice::OpponentLeft => write!(f, "Opponent left the game"),
            Notice::RematchRequested => write!(f, "Opponent wants a rematch"),
        }
    }
}

/// Drives one party's session over a connection to the other party.
pub struct NetworkSynchronizer<C: Connection> {
    role: Role,
    session: Session,
    conn: Option<C>,
    status: ConnectionStatus,
    local_id: Option<String>,

    local_ready: bool,
    remote_ready: bool,
    /// Guest only: a `GUEST_MOVE` is in flight.
    awaiting_result: bool,

    reader: FrameReader,
    tick_count: u64,
    connect_deadline: Option<u64>,

    notices: VecDeque<Notice>,
    last_error: Option<SyncError>,
    protocol_violations: u64,
}

impl<C: Connection> NetworkSynchronizer<C> {
    /// Create a synchronizer whose session waits in `LOBBY`.
    pub fn new(role: Role, config: SessionConfig) -> Result<Self, ConfigError> {
        Self::with_catalog(role, config, CardCatalog::standard())
    }

    /// Create a synchronizer dealing from a custom card pool.
    pub fn with_catalog(
        role: Role,
        config: SessionConfig,
        catalog: CardCatalog,
    ) -> Result<Self, ConfigError> {
        let session = Session::started(config, catalog, GameMode::online(role))?;

        Ok(Self {
            role,
            session,
            conn: None,
            status: ConnectionStatus::Idle,
            local_id: None,
            local_ready: false,
            remote_ready: false,
            awaiting_result: false,
            reader: FrameReader::new(),
            tick_count: 0,
            connect_deadline: None,
            notices: VecDeque::new(),
            last_error: None,
            protocol_violations: 0,
        })
    }

    // === Accessors ===

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// The live session. Mutation goes through the synchronizer only.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Our own signaling id, once issued.
    #[must_use]
    pub fn local_id(&self) -> Option<&str> {
        self.local_id.as_deref()
    }

    #[must_use]
    pub fn peer_id(&self) -> Option<&str> {
        self.conn.as_ref().map(Connection::peer_id)
    }

    #[must_use]
    pub fn connection(&self) -> Option<&C> {
        self.conn.as_ref()
    }

    #[must_use]
    pub fn is_local_ready(&self) -> bool {
        self.local_ready
    }

    #[must_use]
    pub fn is_remote_ready(&self) -> bool {
        self.remote_ready
    }

    /// Guest only: whether a move is waiting for the host's result.
    #[must_use]
    pub fn is_awaiting_result(&self) -> bool {
        self.awaiting_result
    }

    /// Whether the local party may pick an attribute right now.
    #[must_use]
    pub fn can_select(&self) -> bool {
        self.status == ConnectionStatus::Connected
            && self.session.state() == GameState::Playing
            && self.session.turn() == Side::Player
            && !self.awaiting_result
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&SyncError> {
        self.last_error.as_ref()
    }

    /// Malformed or out-of-sequence messages ignored so far.
    #[must_use]
    pub fn protocol_violations(&self) -> u64 {
        self.protocol_violations
    }

    /// Take pending notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    // === Connection events ===

    /// The signaling service issued our id.
    pub fn on_signaling_open(&mut self, id: impl Into<String>) {
        let id = id.into();
        tracing::info!(role = %self.role, %id, "signaling id issued");
        self.local_id = Some(id.clone());
        self.notices.push_back(Notice::IdIssued(id));
    }

    /// Guest: start dialing the host over `conn`.
    ///
    /// The attempt is abandoned if `on_open` does not arrive within the
    /// configured number of ticks.
    pub fn connect(&mut self, conn: C) -> Result<(), InvalidAction> {
        if self.role != Role::Guest {
            return Err(InvalidAction::WrongMode(self.session.mode()));
        }
        if self.session.state() != GameState::Lobby {
            return Err(InvalidAction::WrongState(self.session.state()));
        }
        if let Some(mut old) = self.conn.take() {
            old.close();
        }
        tracing::info!(peer = conn.peer_id(), "connecting");
        self.begin_pending(conn);
        Ok(())
    }

    /// Host: a guest dialed in.
    ///
    /// Only one guest is served; a second one is turned away.
    pub fn accept(&mut self, mut conn: C) {
        if self.role != Role::Host
            || self.status == ConnectionStatus::Connected
            || self.session.state() != GameState::Lobby
        {
            tracing::warn!(peer = conn.peer_id(), "rejecting incoming connection");
            conn.close();
            return;
        }
        if let Some(mut old) = self.conn.take() {
            old.close();
        }
        tracing::info!(peer = conn.peer_id(), "incoming connection");
        self.begin_pending(conn);
    }

    /// The data channel opened.
    pub fn on_open(&mut self) {
        let Some(peer) = self.peer_id().map(str::to_owned) else {
            tracing::debug!("open event without a pending connection");
            return;
        };
        self.connect_deadline = None;
        self.status = ConnectionStatus::Connected;
        self.last_error = None;
        tracing::info!(role = %self.role, %peer, "connected");
        self.notices.push_back(Notice::Connected { peer });

        if self.local_ready {
            self.send(&NetworkMessage::Ready);
        }
    }

    /// A structured message arrived.
    pub fn on_data(&mut self, message: NetworkMessage) {
        if self.conn.is_none() {
            tracing::debug!(role = %self.role, %message, "dropped message without a channel");
            return;
        }
        tracing::debug!(role = %self.role, %message, state = %self.session.state(), "received");
        let result = match self.role {
            Role::Host => self.handle_as_host(message),
            Role::Guest => self.handle_as_guest(message),
        };
        if let Err(err) = result {
            self.violation(err);
        }
    }

    /// Raw bytes arrived on a framed byte transport.
    pub fn on_bytes(&mut self, bytes: &[u8]) {
        self.reader.extend(bytes);
        while let Some(frame) = self.reader.next_message() {
            match frame {
                Ok(message) => self.on_data(message),
                Err(err) => self.violation(ProtocolError::Frame(err)),
            }
        }
    }

    /// The data channel closed.
    pub fn on_close(&mut self) {
        let Some(_) = self.conn.take() else {
            tracing::debug!("close event without a connection");
            return;
        };
        self.connect_deadline = None;
        self.awaiting_result = false;
        self.reader = FrameReader::new();

        match self.session.state() {
            state if state.is_in_game() => {
                self.session.opponent_disconnected();
                self.status = ConnectionStatus::Idle;
                tracing::warn!(role = %self.role, %state, "opponent disconnected mid-game");
                self.last_error = Some(SyncError::MidGameDisconnect);
                self.notices.push_back(Notice::OpponentLeft);
            }
            GameState::GameOver => {
                self.status = ConnectionStatus::Idle;
                tracing::info!("connection closed after game over");
            }
            _ => {
                self.status = ConnectionStatus::Error;
                self.local_ready = false;
                self.remote_ready = false;
                tracing::warn!(role = %self.role, "connection lost in lobby");
                self.last_error = Some(SyncError::Connection(ConnectionError::Closed));
                self.notices.push_back(Notice::LobbyConnectionLost);
            }
        }
    }

    /// The signaling layer or the channel reported an error.
    pub fn on_error(&mut self, err: ConnectionError) {
        tracing::warn!(role = %self.role, %err, "connection error");
        let channel_failed = matches!(err, ConnectionError::Channel(_) | ConnectionError::Network(_));
        if channel_failed && self.session.state().is_in_game() {
            if let Some(conn) = self.conn.as_mut() {
                conn.close();
                self.on_close();
                return;
            }
        }
        match &err {
            ConnectionError::PeerUnavailable(_) => {
                self.abandon_pending();
                self.status = ConnectionStatus::Idle;
            }
            ConnectionError::SignalingDisconnected
                if self.status == ConnectionStatus::Connected => {}
            _ => {
                if self.status == ConnectionStatus::Connecting {
                    self.abandon_pending();
                }
                self.status = ConnectionStatus::Error;
            }
        }
        self.notices.push_back(Notice::ConnectFailed(err.clone()));
        self.last_error = Some(SyncError::Connection(err));
    }

    /// Advance the logical clock by one tick.
    pub fn tick(&mut self) {
        self.tick_count += 1;
        let Some(deadline) = self.connect_deadline else {
            return;
        };
        if self.tick_count < deadline {
            return;
        }
        let ticks = self.session.config().connect_timeout_ticks;
        tracing::warn!(role = %self.role, ticks, "connect timed out");
        self.abandon_pending();
        self.status = ConnectionStatus::Idle;
        self.last_error = Some(SyncError::Timeout { ticks });
        self.notices.push_back(Notice::TimedOut);
    }

    // === Local actions ===

    /// The local party pressed "ready" in the lobby.
    pub fn ready(&mut self) -> Result<(), InvalidAction> {
        if self.session.state() != GameState::Lobby {
            return Err(InvalidAction::WrongState(self.session.state()));
        }
        if self.local_ready {
            return Ok(());
        }
        self.local_ready = true;
        if self.status == ConnectionStatus::Connected {
            self.send(&NetworkMessage::Ready);
        }
        self.try_deal();
        Ok(())
    }

    /// The local party picked an attribute on its turn.
    pub fn select_attribute(&mut self, attribute: Attribute) -> Result<(), InvalidAction> {
        if self.status != ConnectionStatus::Connected {
            return Err(InvalidAction::NotConnected);
        }
        match self.role {
            Role::Host => {
                self.session.select_attribute(Side::Player, attribute)?;
                self.broadcast_result();
            }
            Role::Guest => {
                if self.session.state() != GameState::Playing {
                    return Err(InvalidAction::WrongState(self.session.state()));
                }
                if self.session.turn() != Side::Player {
                    return Err(InvalidAction::NotYourTurn(Side::Player));
                }
                if self.awaiting_result {
                    return Err(InvalidAction::MoveInFlight);
                }
                if self.session.active_card(Side::Player).is_none() {
                    return Err(InvalidAction::NoActiveCard(Side::Player));
                }
                if !self.send(&NetworkMessage::GuestMove { attribute }) {
                    return Err(InvalidAction::NotConnected);
                }
                tracing::debug!(%attribute, "guest move sent");
                self.awaiting_result = true;
                self.notices.push_back(Notice::WaitingForHost);
            }
        }
        Ok(())
    }

    /// The local party advanced past the result.
    pub fn advance(&mut self) -> Result<Advance, InvalidAction> {
        let round = self
            .session
            .pending_round()
            .map(|r| r.number)
            .ok_or(InvalidAction::WrongState(self.session.state()))?;
        let advance = self.session.advance()?;
        self.send(&NetworkMessage::NextRound { round });
        Ok(advance)
    }

    /// The local party asked for a rematch after the game ended.
    ///
    /// The host re-deals immediately; the guest asks the host to.
    pub fn request_rematch(&mut self) -> Result<(), InvalidAction> {
        if self.session.state() != GameState::GameOver {
            return Err(InvalidAction::WrongState(self.session.state()));
        }
        if self.status != ConnectionStatus::Connected {
            return Err(InvalidAction::NotConnected);
        }
        self.send(&NetworkMessage::Restart);
        if self.role == Role::Host {
            self.deal()?;
        }
        Ok(())
    }

    // === Message handling ===

    fn handle_as_host(&mut self, message: NetworkMessage) -> Result<(), ProtocolError> {
        let tag = message.tag();
        match message {
            NetworkMessage::Ready => {
                self.expect_state(tag, &[GameState::Lobby])?;
                self.peer_ready();
                self.try_deal();
            }
            NetworkMessage::GuestMove { attribute } => {
                self.expect_state(tag, &[GameState::Playing])?;
                self.session
                    .select_attribute(Side::Opponent, attribute)
                    .map_err(|source| ProtocolError::Rejected { message: tag, source })?;
                self.broadcast_result();
            }
            NetworkMessage::NextRound { round } => self.remote_advance(round)?,
            NetworkMessage::Restart => {
                self.expect_state(tag, &[GameState::GameOver])?;
                tracing::info!("guest requested a rematch");
                self.notices.push_back(Notice::RematchRequested);
            }
            NetworkMessage::StartGame { .. } | NetworkMessage::RoundResult { .. } => {
                return Err(self.unexpected(tag));
            }
        }
        Ok(())
    }

    fn handle_as_guest(&mut self, message: NetworkMessage) -> Result<(), ProtocolError> {
        let tag = message.tag();
        match message {
            NetworkMessage::Ready => {
                self.expect_state(tag, &[GameState::Lobby])?;
                self.peer_ready();
            }
            NetworkMessage::StartGame { deck } => {
                self.expect_state(tag, &[GameState::Lobby, GameState::GameOver])?;
                self.session
                    .accept_deal(deck)
                    .map_err(|source| ProtocolError::Rejected { message: tag, source })?;
                self.awaiting_result = false;
                self.local_ready = false;
                self.remote_ready = false;
                tracing::info!(cards = self.session.score(Side::Player), "game started by host");
                self.notices.push_back(Notice::GameStarted);
            }
            NetworkMessage::RoundResult {
                attribute,
                outcome,
                host_card,
                guest_card,
            } => {
                self.expect_state(tag, &[GameState::Playing])?;
                if self.session.turn() == Side::Player && !self.awaiting_result {
                    return Err(self.unexpected(tag));
                }
                self.apply_host_result(attribute, outcome, host_card, guest_card)
                    .map_err(|source| ProtocolError::Rejected { message: tag, source })?;
            }
            NetworkMessage::NextRound { round } => self.remote_advance(round)?,
            NetworkMessage::Restart => {
                self.expect_state(tag, &[GameState::GameOver])?;
                self.notices.push_back(Notice::RematchRequested);
            }
            NetworkMessage::GuestMove { .. } => return Err(self.unexpected(tag)),
        }
        Ok(())
    }

    fn apply_host_result(
        &mut self,
        attribute: Attribute,
        host_outcome: Outcome,
        host_card: CardRef,
        guest_card: CardRef,
    ) -> Result<(), InvalidAction> {
        let outcome = host_outcome.to_guest_perspective();
        let cards = SideMap::from_pair(guest_card, host_card);
        self.session.apply_remote_result(attribute, outcome, cards)?;
        self.awaiting_result = false;
        Ok(())
    }

    /// The peer advanced past `round`.
    fn remote_advance(&mut self, round: u32) -> Result<(), ProtocolError> {
        let latest = self.session.round_number();
        match self.session.pending_round().map(|r| r.number) {
            Some(showing) if showing == round => {
                let advance = self.session.advance().map_err(|source| ProtocolError::Rejected {
                    message: "NEXT_ROUND",
                    source,
                })?;
                if let Advance::GameOver { end: GameEnd::Won(side), .. } = advance {
                    tracing::info!(winner = %side, "game over after remote advance");
                }
                Ok(())
            }
            _ if round > latest => Err(ProtocolError::RoundAhead { got: round, latest }),
            _ => {
                tracing::debug!(round, "round already advanced locally");
                Ok(())
            }
        }
    }

    // === Internals ===

    fn begin_pending(&mut self, conn: C) {
        self.conn = Some(conn);
        self.status = ConnectionStatus::Connecting;
        self.connect_deadline =
            Some(self.tick_count + self.session.config().connect_timeout_ticks);
        self.reader = FrameReader::new();
    }

    fn abandon_pending(&mut self) {
        self.connect_deadline = None;
        if let Some(mut conn) = self.conn.take() {
            conn.close();
        }
    }

    fn peer_ready(&mut self) {
        if !self.remote_ready {
            self.remote_ready = true;
            self.notices.push_back(Notice::PeerReady);
        }
    }

    /// Host: deal once both parties are ready.
    fn try_deal(&mut self) {
        if self.role != Role::Host
            || !self.local_ready
            || !self.remote_ready
            || self.status != ConnectionStatus::Connected
        {
            return;
        }
        if let Err(err) = self.deal() {
            tracing::debug!(%err, "deal skipped");
        }
    }

    fn deal(&mut self) -> Result<(), InvalidAction> {
        let deck = self.session.host_deal()?;
        self.local_ready = false;
        self.remote_ready = false;
        self.send(&NetworkMessage::StartGame { deck });
        self.notices.push_back(Notice::GameStarted);
        Ok(())
    }

    /// Host: send the round just resolved.
    fn broadcast_result(&mut self) {
        let Some(round) = self.session.pending_round() else {
            return;
        };
        let message = NetworkMessage::RoundResult {
            attribute: round.attribute,
            outcome: round.outcome,
            host_card: round.cards[Side::Player].clone(),
            guest_card: round.cards[Side::Opponent].clone(),
        };
        self.send(&message);
    }

    /// Send to the peer. Failures are recorded, not returned.
    fn send(&mut self, message: &NetworkMessage) -> bool {
        let Some(conn) = self.conn.as_mut() else {
            tracing::debug!(%message, "no connection, message dropped");
            return false;
        };
        match conn.send(message) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%message, %err, "send failed");
                self.last_error = Some(SyncError::Connection(err));
                false
            }
        }
    }

    fn expect_state(&self, message: &'static str, allowed: &[GameState]) -> Result<(), ProtocolError> {
        if allowed.contains(&self.session.state()) {
            Ok(())
        } else {
            Err(self.unexpected(message))
        }
    }

    fn unexpected(&self, message: &'static str) -> ProtocolError {
        ProtocolError::Unexpected {
            message,
            role: self.role,
            state: self.session.state(),
        }
    }

    fn violation(&mut self, err: ProtocolError) {
        tracing::warn!(role = %self.role, %err, "ignoring message");
        self.protocol_violations += 1;
        self.last_error = Some(SyncError::Protocol(err));
    }
}

impl<C: Connection + std::fmt::Debug> std::fmt::Debug for NetworkSynchronizer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkSynchronizer")
            .field("role", &self.role)
            .field("state", &self.session.state())
            .field("status", &self.status)
            .field("conn", &self.conn)
            .field("protocol_violations", &self.protocol_violations)
            .finish_non_exhaustive()
    }
}
