//! Table actor implementation with async message handling.

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::{
    TableId,
    client::ClientHandle,
    hub::{Hub, HubError},
    lobby::Lobby,
    messages::TableMessage,
};
use crate::game::entities::HandView;

/// Table actor handle for sending messages
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    table_id: TableId,
    instance: Uuid,
}

impl TableHandle {
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// Distinguishes this actor from a later one created under the same id.
    pub fn instance(&self) -> Uuid {
        self.instance
    }

    /// Send a message to the table
    pub async fn send(&self, message: TableMessage) -> Result<(), HubError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| HubError::TableClosed(self.table_id.clone()))
    }

    /// Seats `client` and waits until the table has taken it. A table that
    /// retired first hands the client back; `None` means it was lost.
    pub(crate) async fn register(&self, client: ClientHandle) -> Result<(), Option<ClientHandle>> {
        let (ack, registered) = oneshot::channel();
        match self.sender.send(TableMessage::Register { client, ack }).await {
            Ok(()) => match registered.await {
                Ok(result) => result.map_err(Some),
                Err(_) => Err(None),
            },
            Err(mpsc::error::SendError(TableMessage::Register { client, .. })) => {
                Err(Some(client))
            }
            Err(_) => Err(None),
        }
    }

    pub(crate) fn try_send(&self, message: TableMessage) -> bool {
        self.sender.try_send(message).is_ok()
    }

    /// The hand as `username` sees it right now.
    pub async fn view(&self, username: &str) -> Result<HandView, HubError> {
        let (tx, rx) = oneshot::channel();
        self.send(TableMessage::GetView {
            username: username.to_string(),
            response: tx,
        })
        .await?;
        rx.await
            .map_err(|_| HubError::TableClosed(self.table_id.clone()))
    }
}

/// Table actor owning one lobby. Every event for the table goes through its
/// inbox, so the lobby and engine see them one at a time.
pub struct TableActor {
    id: TableId,
    instance: Uuid,
    lobby: Lobby,
    inbox: mpsc::Receiver<TableMessage>,
    hub: Hub,
}

impl TableActor {
    /// Create a new table actor and the handle used to reach it.
    pub fn new(lobby: Lobby, capacity: usize, hub: Hub) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(capacity);
        let id = lobby.table_id().to_string();
        let instance = Uuid::new_v4();

        let actor = Self {
            id: id.clone(),
            instance,
            lobby,
            inbox,
            hub,
        };
        let handle = TableHandle {
            sender,
            table_id: id,
            instance,
        };

        (actor, handle)
    }

    /// Run the table actor event loop until the table should close.
    pub async fn run(mut self) {
        log::info!("Table {} starting", self.id);

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message).await;
            if self.lobby.should_close() {
                break;
            }
        }

        // Unregister first so new connections get a fresh table, then refuse
        // anything still queued for this one.
        self.hub.retire(&self.id, self.instance).await;
        self.inbox.close();
        let mut dropped = 0;
        while let Ok(message) = self.inbox.try_recv() {
            match message {
                // Hand late joiners back so they can be seated elsewhere.
                TableMessage::Register { client, ack } => {
                    if let Err(Err(client)) = ack.send(Err(client)) {
                        log::debug!("Table {}: {} gave up joining", self.id, client.username);
                    }
                }
                _ => dropped += 1,
            }
        }
        if dropped > 0 {
            log::debug!("Table {}: dropped {} queued messages", self.id, dropped);
        }

        log::info!("Table {} closed", self.id);
    }

    async fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::Register { client, ack } => {
                self.lobby.add_client(client).await;
                let _ = ack.send(Ok(()));
            }

            TableMessage::Unregister { client_id } => {
                // Failures are logged by the lobby.
                let _ = self.lobby.disconnect(client_id);
            }

            TableMessage::Inbound { client_id, message } => {
                self.lobby.message(client_id, message);
            }

            TableMessage::GetView { username, response } => {
                let _ = response.send(self.lobby.view(&username));
            }

            TableMessage::Close => {
                self.lobby.close();
            }
        }
    }
}
