//! # rust-trumps
//!
//! A two-party attribute-comparison card game ("Top Trumps") with local and
//! host-authoritative online play.
//!
//! ## Design Principles
//!
//! 1. **Pure rules**: Round resolution, redistribution, and turn allocation
//!    are pure functions with no knowledge of modes or networking.
//!
//! 2. **Single owner**: One `Session` owns both decks and the turn. Every
//!    event handler mutates it in place, so no handler ever acts on a stale
//!    snapshot.
//!
//! 3. **Host authority**: Online, the host deals and resolves every round.
//!    The guest applies the host's results and never compares cards itself.
//!
//! ## Architecture
//!
//! - **Sans-IO networking**: `NetworkSynchronizer` receives connection
//!   events, messages, and timer ticks from the embedding and sends through
//!   a `Connection` it owns. No threads, no blocking.
//!
//! - **Persistent Data Structures**: Decks are `im::Vector`s, so cloning a
//!   session for simulation is cheap.
//!
//! ## Modules
//!
//! - `core`: Sides and roles, RNG, configuration
//! - `cards`: Attributes, card records, the standard pool
//! - `deck`: Ordered per-party decks
//! - `rules`: Round engine, redistribution, turn allocator
//! - `policy`: Attribute-choice policies for the CPU and simulations
//! - `session`: Session state machine and match simulation
//! - `net`: Wire protocol, framing, and the online synchronizer

pub mod core;
pub mod cards;
pub mod deck;
pub mod rules;
pub mod policy;
pub mod session;
pub mod net;

// Re-export commonly used types
pub use crate::core::{
    Role, Side, SideMap,
    GameRng, GameRngState,
    ConfigError, SessionConfig,
};

pub use crate::cards::{Attribute, Card, CardCatalog, CardId, CardRef, CardStats};

pub use crate::deck::Deck;

pub use crate::rules::{next_turn, redistribute, resolve_round, Outcome, Transfer};

pub use crate::policy::{AttributePolicy, FixedAttribute, HeuristicPolicy, RandomAttribute};

pub use crate::session::{
    Advance, GameEnd, GameMode, GameState, InvalidAction, RoundRecord, Session,
    simulate_match, MatchSummary,
};

pub use crate::net::{
    Connection, ConnectionError, ConnectionStatus, MemoryConnection,
    NetworkMessage, NetworkSynchronizer, Notice, ProtocolError, SyncError,
};
