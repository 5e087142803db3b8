//! PostgreSQL-backed table hooks.

use async_trait::async_trait;
use sqlx::PgPool;

use super::timeouts::with_default_timeout;
use crate::table::{StoreError, StoreResult, TableStore};

/// Updates the `tables` row an outside service created for each table.
pub struct PgTableStore {
    pool: PgPool,
}

impl PgTableStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TableStore for PgTableStore {
    async fn mark_in_progress(&self, table_id: &str) -> StoreResult<()> {
        let result = with_default_timeout(
            sqlx::query("UPDATE tables SET in_progress = TRUE WHERE id = $1")
                .bind(table_id)
                .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(table_id.to_string()));
        }
        Ok(())
    }

    async fn delete_table(&self, table_id: &str) -> StoreResult<()> {
        with_default_timeout(
            sqlx::query("DELETE FROM tables WHERE id = $1")
                .bind(table_id)
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }
}
