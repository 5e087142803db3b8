//! The process-wide table registry.
//!
//! The hub creates a table actor the first time a table id is seen and
//! forgets it once the actor retires. It never touches lobby or engine state
//! itself; all of that happens inside each table's own task.

use std::{collections::HashMap, sync::Arc};

use thiserror::Error;
use tokio::sync::{RwLock, mpsc};

use super::{
    TableId,
    actor::{TableActor, TableHandle},
    client::{ClientHandle, ClientId},
    config::TableConfig,
    lobby::Lobby,
    messages::{GameMessage, TableMessage},
    store::{StoreResult, TableStore},
};
use crate::game::entities::{HandView, Username};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HubError {
    #[error("table {0} is closed")]
    TableClosed(TableId),
    #[error("username must not be empty")]
    InvalidUsername,
}

/// Registry of running tables.
#[derive(Clone)]
pub struct Hub {
    tables: Arc<RwLock<HashMap<TableId, TableHandle>>>,
    store: Arc<dyn TableStore>,
    config: TableConfig,
}

impl Hub {
    pub fn new(store: Arc<dyn TableStore>, config: TableConfig) -> Self {
        Self {
            tables: Arc::new(RwLock::new(HashMap::new())),
            store,
            config,
        }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Joins `username` to `table_id`, creating the table if needed.
    ///
    /// If the table shuts down between lookup and registration, the
    /// connection is retried once on a fresh table.
    pub async fn connect(&self, table_id: &str, username: &str) -> Result<Connection, HubError> {
        let username = Username::new(username);
        if username.is_empty() {
            return Err(HubError::InvalidUsername);
        }

        let (mut client, outbound) =
            ClientHandle::new(username, self.config.client_queue_capacity);
        let client_id = client.id;

        for _ in 0..2 {
            let table = self.get_or_create(table_id).await;
            match table.register(client).await {
                Ok(()) => {
                    return Ok(Connection {
                        client_id,
                        outbound,
                        link: ClientLink { client_id, table },
                    });
                }
                Err(Some(returned)) => {
                    log::debug!("Table {} closed during connect, retrying", table_id);
                    self.retire(table_id, table.instance()).await;
                    client = returned;
                }
                Err(None) => break,
            }
        }

        Err(HubError::TableClosed(table_id.to_string()))
    }

    async fn get_or_create(&self, table_id: &str) -> TableHandle {
        if let Some(handle) = self.get_table(table_id).await {
            return handle;
        }

        let mut tables = self.tables.write().await;
        if let Some(handle) = tables.get(table_id) {
            return handle.clone();
        }

        let lobby = Lobby::new(table_id.to_string(), self.config.clone(), self.store.clone());
        let (actor, handle) = TableActor::new(lobby, self.config.inbox_capacity, self.clone());
        tables.insert(table_id.to_string(), handle.clone());
        drop(tables);

        tokio::spawn(actor.run());
        log::info!("Created table {}", table_id);

        handle
    }

    /// Get a table handle
    pub async fn get_table(&self, table_id: &str) -> Option<TableHandle> {
        let tables = self.tables.read().await;
        tables.get(table_id).cloned()
    }

    /// Removes a table's registry entry if it still belongs to `instance`,
    /// and deletes the table record. A table re-created under the same id is
    /// left alone.
    pub(crate) async fn retire(&self, table_id: &str, instance: uuid::Uuid) {
        let removed = {
            let mut tables = self.tables.write().await;
            let owned = tables
                .get(table_id)
                .is_some_and(|handle| handle.instance() == instance);
            if owned {
                tables.remove(table_id);
            }
            owned
        };

        if removed {
            log::info!("Retired table {}", table_id);
            if let Err(err) = self.store.delete_table(table_id).await {
                log::error!("Failed to delete table {}: {}", table_id, err);
            }
        }
    }

    /// Shuts a table down, disconnecting its clients, and deletes its record.
    pub async fn delete_table(&self, table_id: &str) -> StoreResult<()> {
        let handle = self.tables.write().await.remove(table_id);
        if let Some(handle) = handle
            && !handle.try_send(TableMessage::Close)
        {
            log::warn!("Table {} did not accept close", table_id);
        }

        self.store.delete_table(table_id).await?;
        log::info!("Deleted table {}", table_id);
        Ok(())
    }

    /// The hand as `username` sees it at `table_id`, if the table is running.
    pub async fn view(&self, table_id: &str, username: &str) -> Option<HandView> {
        let handle = self.get_table(table_id).await?;
        handle.view(username).await.ok()
    }

    /// Get active table count
    pub async fn active_table_count(&self) -> usize {
        let tables = self.tables.read().await;
        tables.len()
    }

    /// Ids of every running table, sorted.
    pub async fn list_tables(&self) -> Vec<TableId> {
        let tables = self.tables.read().await;
        let mut ids: Vec<_> = tables.keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// What a transport gets back from [`Hub::connect`]: the queue to drain and
/// the link to push inbound envelopes through.
#[derive(Debug)]
pub struct Connection {
    pub client_id: ClientId,
    pub outbound: mpsc::Receiver<GameMessage>,
    pub link: ClientLink,
}

/// The inbound half of a connection.
#[derive(Debug, Clone)]
pub struct ClientLink {
    client_id: ClientId,
    table: TableHandle,
}

impl ClientLink {
    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn table_id(&self) -> &str {
        self.table.table_id()
    }

    /// Hands an inbound envelope to the table.
    pub async fn forward(&self, message: GameMessage) -> Result<(), HubError> {
        self.table
            .send(TableMessage::Inbound {
                client_id: self.client_id,
                message,
            })
            .await
    }

    /// Unregisters the connection. A table that is already gone needs no
    /// unregistration.
    pub async fn leave(self) {
        let _ = self
            .table
            .send(TableMessage::Unregister {
                client_id: self.client_id,
            })
            .await;
    }
}
