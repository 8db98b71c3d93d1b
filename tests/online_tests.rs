//! Host-authoritative online protocol tests.
//!
//! Two synchronizers are wired back to back through in-memory connections.
//! The harness delivers queued messages in order, one party at a time, the
//! way an event loop would.

use rust_trumps::cards::{Attribute, Card, CardCatalog, CardStats};
use rust_trumps::core::{GameRng, Role, SessionConfig, Side};
use rust_trumps::net::{
    encode_frame, ConnectionError, ConnectionStatus, MemoryConnection, NetworkMessage,
    NetworkSynchronizer, Notice, ProtocolError, SyncError,
};
use rust_trumps::policy::{AttributePolicy, HeuristicPolicy};
use rust_trumps::session::{GameEnd, GameState};

type Sync = NetworkSynchronizer<MemoryConnection>;

struct Table {
    host: Sync,
    guest: Sync,
    /// Messages the host sent, waiting for the guest.
    to_guest: MemoryConnection,
    /// Messages the guest sent, waiting for the host.
    to_host: MemoryConnection,
    /// Every message the guest ever received, in order.
    guest_inbox: Vec<NetworkMessage>,
}

impl Table {
    fn new(config: SessionConfig) -> Self {
        Self::with_catalog(config, CardCatalog::standard())
    }

    fn with_catalog(config: SessionConfig, catalog: CardCatalog) -> Self {
        let mut host = Sync::with_catalog(Role::Host, config.clone(), catalog.clone()).unwrap();
        let mut guest = Sync::with_catalog(Role::Guest, config, catalog).unwrap();
        host.on_signaling_open("host-id");
        guest.on_signaling_open("guest-id");

        let to_host = MemoryConnection::new("host-id");
        let to_guest = MemoryConnection::new("guest-id");
        guest.connect(to_host.clone()).unwrap();
        host.accept(to_guest.clone());
        host.on_open();
        guest.on_open();

        Self { host, guest, to_guest, to_host, guest_inbox: Vec::new() }
    }

    /// Deliver until both directions are quiet.
    fn pump(&mut self) {
        loop {
            let for_guest = self.to_guest.drain();
            let for_host = self.to_host.drain();
            if for_guest.is_empty() && for_host.is_empty() {
                break;
            }
            for msg in for_guest {
                self.guest_inbox.push(msg.clone());
                self.guest.on_data(msg);
            }
            for msg in for_host {
                self.host.on_data(msg);
            }
        }
    }

    fn start(&mut self) {
        self.host.ready().unwrap();
        self.guest.ready().unwrap();
        self.pump();
    }

    fn party(&mut self, role: Role) -> &mut Sync {
        match role {
            Role::Host => &mut self.host,
            Role::Guest => &mut self.guest,
        }
    }

    /// The role whose turn it is, from the host's authoritative view.
    fn leader(&self) -> Role {
        let turn = self.host.session().turn();
        if Role::Host.host_side() == turn {
            Role::Host
        } else {
            Role::Guest
        }
    }

    fn assert_lockstep(&self) {
        let h = self.host.session();
        let g = self.guest.session();
        assert_eq!(h.state(), g.state());
        assert_eq!(h.score(Side::Player), g.score(Side::Opponent));
        assert_eq!(h.score(Side::Opponent), g.score(Side::Player));
        assert!(h.deck(Side::Opponent).iter().eq(g.deck(Side::Player).iter()));
        assert_eq!(h.turn(), g.turn().other());
        assert_eq!(h.round_number(), g.round_number());
    }
}

/// Both ready: the host deals once and the guest receives its half.
#[test]
fn test_handshake_and_deal() {
    let mut table = Table::new(SessionConfig::new().with_seed(1));
    assert_eq!(table.host.status(), ConnectionStatus::Connected);
    assert_eq!(table.guest.status(), ConnectionStatus::Connected);
    assert_eq!(table.host.peer_id(), Some("guest-id"));

    table.start();

    assert_eq!(table.host.session().state(), GameState::Playing);
    assert_eq!(table.guest.session().state(), GameState::Playing);
    assert_eq!(table.guest.session().score(Side::Player), 16);
    assert_eq!(table.guest.session().score(Side::Opponent), 16);
    assert!(table.guest.session().deck(Side::Opponent).iter().all(|c| c.is_placeholder()));
    assert_eq!(table.host.session().turn(), Side::Player);
    assert_eq!(table.guest.session().turn(), Side::Opponent);
    table.assert_lockstep();

    let deals = table
        .guest_inbox
        .iter()
        .filter(|m| matches!(m, NetworkMessage::StartGame { .. }))
        .count();
    assert_eq!(deals, 1);
    assert!(table.guest.take_notices().contains(&Notice::GameStarted));
}

/// The host waits for both flags before dealing.
#[test]
fn test_no_deal_until_both_ready() {
    let mut table = Table::new(SessionConfig::new().with_seed(1));
    table.guest.ready().unwrap();
    table.pump();
    assert_eq!(table.host.session().state(), GameState::Lobby);
    assert!(table.host.is_remote_ready());
    assert!(table.host.take_notices().contains(&Notice::PeerReady));

    table.host.ready().unwrap();
    table.pump();
    assert_eq!(table.host.session().state(), GameState::Playing);
}

/// One card each: host leads on members and wins the game.
#[test]
fn test_scenario_host_wins_single_card() {
    let mut catalog = CardCatalog::new();
    catalog.register(Card::new("h", "H", CardStats { members: 7, debut_year: 2013, ..Default::default() }));
    catalog.register(Card::new("g", "G", CardStats { members: 4, debut_year: 2016, ..Default::default() }));

    // Find a seed that hands the host the seven-member card.
    let config = (0..64)
        .map(|seed| SessionConfig::new().with_seed(seed).with_deck_size(1))
        .find(|config| {
            let mut probe = Table::with_catalog(config.clone(), catalog.clone());
            probe.start();
            probe.host.session().deck(Side::Player).peek_top().unwrap().id.as_str() == "h"
        })
        .unwrap();

    let mut table = Table::with_catalog(config, catalog);
    table.start();
    table.host.select_attribute(Attribute::Members).unwrap();
    table.pump();

    let round = table.guest.session().pending_round().unwrap();
    assert_eq!(round.outcome, rust_trumps::rules::Outcome::WinB);
    assert_eq!(round.cards[Side::Opponent].id.as_str(), "h");

    table.host.advance().unwrap();
    table.pump();

    for party in [&table.host, &table.guest] {
        assert_eq!(party.session().state(), GameState::GameOver);
    }
    assert_eq!(table.host.session().winner(), Some(Side::Player));
    assert_eq!(table.guest.session().winner(), Some(Side::Opponent));
    assert_eq!(table.host.session().score(Side::Player), 2);
    assert_eq!(table.guest.session().score(Side::Player), 0);
}

/// The guest only reaches RESULT after a ROUND_RESULT arrives.
#[test]
fn test_guest_waits_for_host_result() {
    let mut table = Table::new(SessionConfig::new().with_seed(3));
    table.start();

    // Play host-led rounds until the guest leads.
    let mut guard = 0;
    while table.leader() == Role::Host && table.host.session().state() == GameState::Playing {
        table.host.select_attribute(Attribute::Albums).unwrap();
        table.pump();
        table.host.advance().unwrap();
        table.pump();
        guard += 1;
        assert!(guard < 1000);
    }
    if table.host.session().state() != GameState::Playing {
        return;
    }

    table.guest.select_attribute(Attribute::Fame).unwrap();
    assert!(table.guest.is_awaiting_result());
    assert_eq!(table.guest.session().state(), GameState::Playing);
    assert_eq!(
        table.guest.select_attribute(Attribute::Fame),
        Err(rust_trumps::session::InvalidAction::MoveInFlight)
    );

    let results_before = count_results(&table.guest_inbox);
    table.pump();
    assert_eq!(count_results(&table.guest_inbox), results_before + 1);
    assert_eq!(table.guest.session().state(), GameState::Result);
    assert!(!table.guest.is_awaiting_result());
    table.assert_lockstep();
}

fn count_results(inbox: &[NetworkMessage]) -> usize {
    inbox.iter().filter(|m| matches!(m, NetworkMessage::RoundResult { .. })).count()
}

/// Whoever advances, each round is applied exactly once on both sides.
#[test]
fn test_full_match_stays_in_lockstep() {
    let mut table = Table::new(SessionConfig::new().with_seed(8));
    table.start();
    let mut rng = GameRng::new(99);
    let mut policy = HeuristicPolicy::default();

    let mut rounds = 0;
    while table.host.session().state() == GameState::Playing && rounds < 10_000 {
        let leader = table.leader();
        let card = table.party(leader).session().active_card(Side::Player).cloned().unwrap();
        let attribute = policy.choose(&card, &mut rng);
        table.party(leader).select_attribute(attribute).unwrap();
        table.pump();
        table.assert_lockstep();
        assert_eq!(table.host.session().state(), GameState::Result);

        // Alternate who clicks advance; sometimes both click before delivery.
        match rounds % 3 {
            0 => {
                table.host.advance().unwrap();
            }
            1 => {
                table.guest.advance().unwrap();
            }
            _ => {
                table.host.advance().unwrap();
                table.guest.advance().unwrap();
            }
        }
        table.pump();
        table.assert_lockstep();
        assert_eq!(table.host.session().card_count(), 32);
        rounds += 1;
    }

    assert_eq!(table.host.session().state(), GameState::GameOver);
    assert_eq!(table.guest.session().state(), GameState::GameOver);
    assert_eq!(table.host.protocol_violations(), 0);
    assert_eq!(table.guest.protocol_violations(), 0);
    let winner = table.host.session().winner().unwrap();
    assert_eq!(table.guest.session().winner(), Some(winner.other()));
}

/// A duplicate NEXT_ROUND for an already-advanced round is a no-op.
#[test]
fn test_next_round_is_idempotent() {
    let mut table = Table::new(SessionConfig::new().with_seed(4));
    table.start();
    table.host.select_attribute(Attribute::Fame).unwrap();
    table.pump();
    table.host.advance().unwrap();
    table.pump();
    table.assert_lockstep();

    let sizes = table.guest.session().score(Side::Player);
    table.guest.on_data(NetworkMessage::NextRound { round: 1 });
    table.host.on_data(NetworkMessage::NextRound { round: 1 });
    assert_eq!(table.guest.session().score(Side::Player), sizes);
    assert_eq!(table.guest.protocol_violations(), 0);
    assert_eq!(table.host.protocol_violations(), 0);
    table.assert_lockstep();
}

/// Closing mid-game ends it for the survivor.
#[test]
fn test_disconnect_mid_game() {
    for state_round in [false, true] {
        let mut table = Table::new(SessionConfig::new().with_seed(5));
        table.start();
        if state_round {
            table.host.select_attribute(Attribute::Awards).unwrap();
            table.pump();
            assert_eq!(table.guest.session().state(), GameState::Result);
        }

        table.guest.on_close();
        assert_eq!(table.guest.session().state(), GameState::GameOver);
        assert_eq!(table.guest.session().end(), Some(GameEnd::OpponentLeft));
        assert!(matches!(table.guest.last_error(), Some(SyncError::MidGameDisconnect)));
        assert!(table.guest.take_notices().contains(&Notice::OpponentLeft));
        assert_eq!(table.guest.status(), ConnectionStatus::Idle);

        // A late result does not revive the game.
        table.guest.on_data(NetworkMessage::NextRound { round: 1 });
        assert_eq!(table.guest.session().state(), GameState::GameOver);
        assert_eq!(table.guest.request_rematch(), Err(rust_trumps::session::InvalidAction::NotConnected));
    }
}

/// A channel failure mid-game ends the game instead of stranding the leader.
#[test]
fn test_channel_error_mid_game_ends_game() {
    let mut table = Table::new(SessionConfig::new().with_seed(5));
    table.start();
    assert_eq!(table.leader(), Role::Host);
    assert_eq!(table.host.session().state(), GameState::Playing);

    table.host.on_error(ConnectionError::Channel("ice failure".into()));
    assert!(!table.to_guest.is_open());
    assert_eq!(table.host.session().state(), GameState::GameOver);
    assert_eq!(table.host.session().end(), Some(GameEnd::OpponentLeft));
    assert_eq!(table.host.status(), ConnectionStatus::Idle);
    assert!(table.host.take_notices().contains(&Notice::OpponentLeft));

    let violations = table.host.protocol_violations();
    table.host.on_data(NetworkMessage::Ready);
    assert_eq!(table.host.protocol_violations(), violations);
    assert_eq!(table.host.session().state(), GameState::GameOver);

    // The transport's own close event arriving later changes nothing.
    table.host.on_close();
    assert_eq!(table.host.session().end(), Some(GameEnd::OpponentLeft));
}

/// Closing in the lobby is a soft error; a new connection can follow.
#[test]
fn test_lobby_close_is_recoverable() {
    let mut table = Table::new(SessionConfig::new().with_seed(6));
    table.guest.ready().unwrap();
    table.guest.on_close();

    assert_eq!(table.guest.session().state(), GameState::Lobby);
    assert_eq!(table.guest.status(), ConnectionStatus::Error);
    assert!(!table.guest.is_local_ready());
    assert!(table.guest.take_notices().contains(&Notice::LobbyConnectionLost));

    let retry = MemoryConnection::new("host-id");
    table.guest.connect(retry.clone()).unwrap();
    assert_eq!(table.guest.status(), ConnectionStatus::Connecting);
    table.guest.on_open();
    assert_eq!(table.guest.status(), ConnectionStatus::Connected);
    assert!(table.guest.last_error().is_none());
}

/// A close after the game ended is not an error.
#[test]
fn test_close_after_game_over_ignored() {
    let mut catalog = CardCatalog::new();
    catalog.register(Card::new("x", "X", CardStats { albums: 3, ..Default::default() }));
    catalog.register(Card::new("y", "Y", CardStats { albums: 8, ..Default::default() }));
    let mut table = Table::with_catalog(SessionConfig::new().with_seed(6).with_deck_size(1), catalog);
    table.start();
    table.host.select_attribute(Attribute::Albums).unwrap();
    table.pump();
    table.host.advance().unwrap();
    table.pump();
    let winner = table.host.session().winner();
    assert!(winner.is_some());

    table.host.on_close();
    table.guest.on_close();
    table.guest.on_close();

    for party in [&table.host, &table.guest] {
        assert_eq!(party.session().state(), GameState::GameOver);
        assert_eq!(party.status(), ConnectionStatus::Idle);
        assert!(party.last_error().is_none());
    }
    assert_eq!(table.host.session().winner(), winner);
    assert_ne!(table.guest.session().end(), Some(GameEnd::OpponentLeft));
}

/// Out-of-role and out-of-sequence messages are ignored and counted.
#[test]
fn test_malformed_messages_ignored() {
    let mut table = Table::new(SessionConfig::new().with_seed(7));
    table.start();
    let before = table.guest.session().deck(Side::Player).clone();

    // Only the host sends results and deals; only the guest sends moves.
    table.host.on_data(NetworkMessage::StartGame { deck: Vec::new() });
    table.guest.on_data(NetworkMessage::GuestMove { attribute: Attribute::Fame });
    // Guest move while it is the host's turn.
    table.host.on_data(NetworkMessage::GuestMove { attribute: Attribute::Fame });
    // Advance for a round that never happened.
    table.guest.on_data(NetworkMessage::NextRound { round: 40 });
    // Deal in the middle of a game.
    table.guest.on_data(NetworkMessage::StartGame { deck: Vec::new() });
    // Garbage bytes.
    table.guest.on_bytes(&[2, 0, 0, 0, 0xff, 0xff]);

    assert_eq!(table.host.protocol_violations(), 2);
    assert_eq!(table.guest.protocol_violations(), 4);
    assert!(matches!(
        table.host.last_error(),
        Some(SyncError::Protocol(ProtocolError::Rejected { .. }))
    ));
    assert_eq!(table.guest.session().deck(Side::Player), &before);
    assert_eq!(table.host.session().state(), GameState::Playing);
    assert_eq!(table.guest.session().state(), GameState::Playing);
}

/// Frames on a byte transport drive the same handlers.
#[test]
fn test_framed_bytes_are_decoded() {
    let mut table = Table::new(SessionConfig::new().with_seed(7));
    table.host.ready().unwrap();
    table.pump();
    assert!(table.guest.is_remote_ready());

    table.guest.ready().unwrap();
    let bytes: Vec<u8> = table
        .to_host
        .drain()
        .iter()
        .flat_map(|m| encode_frame(m).unwrap())
        .collect();
    let (a, b) = bytes.split_at(3);
    table.host.on_bytes(a);
    assert_eq!(table.host.session().state(), GameState::Lobby);
    table.host.on_bytes(b);
    assert_eq!(table.host.session().state(), GameState::Playing);
}

/// Guest asks for a rematch; the host re-deals.
#[test]
fn test_rematch() {
    let mut catalog = CardCatalog::new();
    catalog.register(Card::new("x", "X", CardStats { fame: 10, ..Default::default() }));
    catalog.register(Card::new("y", "Y", CardStats { fame: 20, ..Default::default() }));
    let mut table = Table::with_catalog(SessionConfig::new().with_seed(2).with_deck_size(1), catalog);
    table.start();
    table.host.select_attribute(Attribute::Fame).unwrap();
    table.pump();
    table.guest.advance().unwrap();
    table.pump();
    assert_eq!(table.host.session().state(), GameState::GameOver);
    assert_eq!(table.guest.session().state(), GameState::GameOver);

    table.guest.request_rematch().unwrap();
    table.pump();
    assert!(table.host.take_notices().contains(&Notice::RematchRequested));
    assert_eq!(table.host.session().state(), GameState::GameOver);

    table.host.request_rematch().unwrap();
    table.pump();
    assert_eq!(table.host.session().state(), GameState::Playing);
    assert_eq!(table.guest.session().state(), GameState::Playing);
    assert_eq!(table.guest.session().round_number(), 0);
    table.assert_lockstep();
}

/// A connect that never opens times out back to idle.
#[test]
fn test_connect_timeout() {
    let mut guest = Sync::new(Role::Guest, SessionConfig::new()).unwrap();
    let conn = MemoryConnection::new("host-id");
    guest.connect(conn.clone()).unwrap();
    for _ in 0..10 {
        guest.tick();
    }
    assert_eq!(guest.status(), ConnectionStatus::Idle);
    assert!(!conn.is_open());
    assert!(matches!(guest.last_error(), Some(SyncError::Timeout { ticks: 10 })));
    assert_eq!(guest.session().state(), GameState::Lobby);
}

/// Network errors while connecting are reported and can be retried.
#[test]
fn test_network_error_while_connecting() {
    let mut guest = Sync::new(Role::Guest, SessionConfig::new()).unwrap();
    guest.connect(MemoryConnection::new("host-id")).unwrap();
    guest.on_error(ConnectionError::Network("unreachable".into()));

    assert_eq!(guest.status(), ConnectionStatus::Error);
    assert!(guest.peer_id().is_none());
    let notices = guest.take_notices();
    assert!(notices.iter().any(|n| matches!(n, Notice::ConnectFailed(ConnectionError::Network(_)))));

    guest.connect(MemoryConnection::new("host-id")).unwrap();
    guest.on_open();
    assert_eq!(guest.status(), ConnectionStatus::Connected);
}
