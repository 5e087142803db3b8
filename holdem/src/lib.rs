//! # Holdem
//!
//! A Texas Hold'em engine and the concurrent table layer that serves it to
//! many connected players.
//!
//! ## Architecture
//!
//! - **Engine** ([`game::TexasHoldem`]): one hand's state and the action
//!   state machine. Enforces turn order, betting legality, round progression
//!   and showdown scoring. Every operation either applies completely or
//!   leaves the hand untouched.
//! - **Lobby** ([`table::Lobby`]): one engine plus its connected clients.
//!   Decodes inbound envelopes into actions and sends each client its own
//!   sanitized view.
//! - **Table actor** ([`table::TableActor`]): a Tokio task owning a lobby.
//!   All events for a table are serialized through its inbox.
//! - **Hub** ([`table::Hub`]): creates tables on first connect and retires
//!   them when their hand ends or their last client leaves.
//!
//! ## Core Modules
//!
//! - [`game`]: cards, hand evaluation and the engine
//! - [`table`]: lobby, actors, hub and the wire envelope
//! - [`db`]: PostgreSQL pool and table hooks
//!
//! ## Example
//!
//! ```
//! use holdem::{Action, TexasHoldem};
//!
//! let mut game = TexasHoldem::new();
//! for name in ["alice", "bob", "carol"] {
//!     game.add_player(name, 100).unwrap();
//! }
//! game.start_game().unwrap();
//! assert_eq!(game.pot(), 3);
//!
//! game.advance_state("alice", Action::Call).unwrap();
//! assert_eq!(game.current_player(), 1);
//! ```

/// Core game logic, entities, and hand evaluation.
pub mod game;
pub use game::{
    DisconnectOutcome, GameError, TexasHoldem,
    constants::{self, MAX_PLAYERS, REQUIRED_PLAYERS},
    entities::{self, Action, Card, Deck, HandView, Player, Round, Username},
    eval,
};

/// Tables, the hub and the client envelope.
pub mod table;
pub use table::{Connection, GameMessage, Hub, HubError, MessageKind, TableConfig};

/// Database connection pooling and PostgreSQL table hooks.
pub mod db;
