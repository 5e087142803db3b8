//! One table's engine plus the clients watching it.
//!
//! The lobby turns inbound envelopes into engine calls and engine state into
//! one sanitized `state` envelope per client. It is owned by a single table
//! actor and never shared, so nothing here locks.

use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;

use super::{
    TableId,
    client::{ClientHandle, ClientId},
    config::TableConfig,
    messages::{GameMessage, MessageKind},
    store::TableStore,
};
use crate::game::{
    DisconnectOutcome, GameError, TexasHoldem,
    entities::{Action, HandView, Username},
};

pub const INCORRECT_ACTION: &str = "incorrect action";

pub struct Lobby {
    table_id: TableId,
    engine: TexasHoldem,
    clients: Vec<ClientHandle>,
    config: TableConfig,
    store: Arc<dyn TableStore>,
}

impl Lobby {
    pub fn new(table_id: TableId, config: TableConfig, store: Arc<dyn TableStore>) -> Self {
        Self::with_engine(table_id, TexasHoldem::new(), config, store)
    }

    pub fn with_engine(
        table_id: TableId,
        engine: TexasHoldem,
        config: TableConfig,
        store: Arc<dyn TableStore>,
    ) -> Self {
        Self {
            table_id,
            engine,
            clients: Vec::new(),
            config,
            store,
        }
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn engine(&self) -> &TexasHoldem {
        &self.engine
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn view(&self, username: &str) -> HandView {
        self.engine.sanitize_state(username)
    }

    fn username_of(&self, client_id: ClientId) -> Option<Username> {
        self.clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.username.clone())
    }

    /// Seats the client (if new) and tries to start the hand.
    pub async fn add_client(&mut self, client: ClientHandle) {
        let client_id = client.id;
        let username = client.username.clone();
        log::info!(
            "Table {}: {} connected ({})",
            self.table_id,
            username,
            client_id
        );
        self.clients.push(client);

        if let Err(err) = self
            .engine
            .add_player(username.as_str(), self.config.starting_stack)
        {
            log::debug!("Table {}: {} can't sit: {}", self.table_id, username, err);
            self.send(client_id, GameMessage::error(&err));
            if !self.engine.contains_player(username.as_str()) {
                self.drop_client(client_id);
            }
            return;
        }

        match self.engine.start_game() {
            Ok(()) => {
                log::info!(
                    "Table {}: hand started with {} players",
                    self.table_id,
                    self.engine.players().len()
                );
                if let Err(err) = self.store.mark_in_progress(&self.table_id).await {
                    log::error!(
                        "Table {}: failed to mark table in progress: {}",
                        self.table_id,
                        err
                    );
                }
                self.broadcast();
            }
            // Still waiting for players, or rejoining a running hand.
            Err(GameError::NotEnoughPlayers | GameError::AlreadyStarted) => {
                self.send_state(client_id);
            }
            Err(err) => {
                log::warn!("Table {}: failed to start hand: {}", self.table_id, err);
                self.send(client_id, GameMessage::error(&err));
            }
        }
    }

    /// Handles one inbound envelope from `client_id`.
    pub fn message(&mut self, client_id: ClientId, message: GameMessage) {
        let Some(username) = self.username_of(client_id) else {
            return;
        };

        match message.kind {
            MessageKind::Action => {
                let action = match message.data.parse::<Action>() {
                    Ok(action) => action,
                    Err(err) => {
                        self.send(client_id, GameMessage::error(&err));
                        return;
                    }
                };
                if let Err(err) = self.engine.advance_state(username.as_str(), action) {
                    log::debug!(
                        "Table {}: {} {} rejected: {}",
                        self.table_id,
                        username,
                        action,
                        err
                    );
                    self.send(client_id, GameMessage::error(&err));
                }
                // Errors are always followed by fresh state.
                self.broadcast();
            }
            _ => self.send(client_id, GameMessage::error(INCORRECT_ACTION)),
        }
    }

    /// Removes the client and, if it was the last connection for that name,
    /// takes the seat out of the hand.
    pub fn disconnect(&mut self, client_id: ClientId) -> Result<(), GameError> {
        let Some(idx) = self.clients.iter().position(|c| c.id == client_id) else {
            return Ok(());
        };
        let client = self.clients.remove(idx);
        log::info!(
            "Table {}: {} disconnected ({})",
            self.table_id,
            client.username,
            client_id
        );

        if self.clients.iter().any(|c| c.username == client.username) {
            return Ok(());
        }

        match self.engine.disconnect(client.username.as_str()) {
            Ok(DisconnectOutcome::OwnTurn | DisconnectOutcome::Folded) => {
                self.broadcast();
                Ok(())
            }
            Ok(DisconnectOutcome::Unchanged) => Ok(()),
            Err(err) => {
                log::warn!(
                    "Table {}: disconnecting {} failed: {}",
                    self.table_id,
                    client.username,
                    err
                );
                Err(err)
            }
        }
    }

    /// Sends every client its own view of the hand.
    pub fn broadcast(&mut self) {
        let mut failed = Vec::new();
        for client in &self.clients {
            let view = self.engine.sanitize_state(client.username.as_str());
            let message = match GameMessage::state(&view) {
                Ok(message) => message,
                Err(err) => {
                    log::error!("Table {}: failed to encode state: {}", self.table_id, err);
                    continue;
                }
            };
            if let Err(err) = client.outbound.try_send(message) {
                self.log_send_failure(client, &err);
                failed.push(client.id);
            }
        }

        for client_id in failed {
            self.force_disconnect(client_id);
        }
    }

    fn send_state(&mut self, client_id: ClientId) {
        let Some(username) = self.username_of(client_id) else {
            return;
        };
        match GameMessage::state(&self.engine.sanitize_state(username.as_str())) {
            Ok(message) => self.send(client_id, message),
            Err(err) => log::error!("Table {}: failed to encode state: {}", self.table_id, err),
        }
    }

    /// Non-blocking send. A client that can't take the message is dropped.
    fn send(&mut self, client_id: ClientId, message: GameMessage) {
        let Some(client) = self.clients.iter().find(|c| c.id == client_id) else {
            return;
        };
        if let Err(err) = client.outbound.try_send(message) {
            self.log_send_failure(client, &err);
            self.force_disconnect(client_id);
        }
    }

    fn log_send_failure(&self, client: &ClientHandle, err: &TrySendError<GameMessage>) {
        match err {
            TrySendError::Full(_) => log::warn!(
                "Table {}: outbound queue full for {} ({}), disconnecting",
                self.table_id,
                client.username,
                client.id
            ),
            TrySendError::Closed(_) => log::debug!(
                "Table {}: {} ({}) already gone",
                self.table_id,
                client.username,
                client.id
            ),
        }
    }

    fn force_disconnect(&mut self, client_id: ClientId) {
        // Failures are already logged by `disconnect`.
        let _ = self.disconnect(client_id);
    }

    /// Forgets a client that never got a seat.
    fn drop_client(&mut self, client_id: ClientId) {
        self.clients.retain(|c| c.id != client_id);
    }

    /// Drops every connection. Each client's outbound queue closes.
    pub fn close(&mut self) {
        log::info!(
            "Table {}: closing with {} clients",
            self.table_id,
            self.clients.len()
        );
        self.clients.clear();
    }

    pub fn should_close(&self) -> bool {
        self.engine.should_be_disbanded() || self.clients.is_empty()
    }
}
