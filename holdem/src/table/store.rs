//! Side-effect hooks on the persisted table record.
//!
//! Tables don't persist hands. They only tell the outside world that a hand
//! started and that the table is gone. Failures are reported but never stop
//! a hand.

use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use super::TableId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("table {0} not found")]
    NotFound(TableId),
    #[error("database operation timed out after {0:?}")]
    Timeout(Duration),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait TableStore: Send + Sync {
    /// Called once per table when its hand starts.
    async fn mark_in_progress(&self, table_id: &str) -> StoreResult<()>;

    /// Called once per table when its actor retires.
    async fn delete_table(&self, table_id: &str) -> StoreResult<()>;
}

/// Keeps table status in memory. Used when no database is configured, and
/// handy in tests since it remembers what happened.
#[derive(Debug, Default)]
pub struct MemoryTableStore {
    in_progress: RwLock<HashSet<TableId>>,
    deleted: RwLock<HashMap<TableId, usize>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_in_progress(&self, table_id: &str) -> bool {
        self.in_progress.read().await.contains(table_id)
    }

    /// How many times `table_id` has been deleted.
    pub async fn deletions(&self, table_id: &str) -> usize {
        self.deleted.read().await.get(table_id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn mark_in_progress(&self, table_id: &str) -> StoreResult<()> {
        self.in_progress.write().await.insert(table_id.to_string());
        Ok(())
    }

    async fn delete_table(&self, table_id: &str) -> StoreResult<()> {
        self.in_progress.write().await.remove(table_id);
        *self
            .deleted
            .write()
            .await
            .entry(table_id.to_string())
            .or_default() += 1;
        Ok(())
    }
}
