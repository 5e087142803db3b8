//! Tables: the concurrent layer around the Hold'em engine.
//!
//! This module implements:
//! - [`Lobby`]: one engine plus the clients connected to it
//! - [`TableActor`]: a Tokio task that owns a lobby and drains its inbox
//! - [`Hub`]: the registry that creates table actors on demand and forgets
//!   them when they retire
//! - [`GameMessage`]: the JSON envelope exchanged with clients
//! - [`TableStore`]: hooks on the persisted table record
//!
//! ## Architecture
//!
//! Each table runs in a separate Tokio task with a bounded mpsc inbox.
//! Register, unregister and inbound-message events for a table all go
//! through that inbox, so they are applied one at a time and in order.
//! Different tables run in parallel.
//!
//! Outbound delivery never blocks a table: every client has a bounded
//! queue, and a client whose queue is full is disconnected.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use holdem::table::{GameMessage, Hub, MemoryTableStore, TableConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let hub = Hub::new(Arc::new(MemoryTableStore::new()), TableConfig::default());
//!
//!     let mut conn = hub.connect("table-1", "alice").await.unwrap();
//!     conn.link.forward(GameMessage::action("call")).await.unwrap();
//!     while let Some(message) = conn.outbound.recv().await {
//!         println!("{}: {}", serde_json::to_string(&message.kind).unwrap(), message.data);
//!     }
//! }
//! ```

pub mod actor;
pub mod client;
pub mod config;
pub mod hub;
pub mod lobby;
pub mod messages;
pub mod store;

/// Opaque table identifier chosen by whoever hands out tables.
pub type TableId = String;

pub use actor::{TableActor, TableHandle};
pub use client::{ClientHandle, ClientId};
pub use config::TableConfig;
pub use hub::{ClientLink, Connection, Hub, HubError};
pub use lobby::Lobby;
pub use messages::{GameMessage, MessageKind, TableMessage};
pub use store::{MemoryTableStore, StoreError, StoreResult, TableStore};
