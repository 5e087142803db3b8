//! Table configuration.

use serde::{Deserialize, Serialize};

/// Per-table tuning shared by every table a hub creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Chips each new seat starts with.
    pub starting_stack: i64,

    /// Capacity of each client's outbound queue. A client whose queue is full
    /// is treated as unresponsive and disconnected.
    pub client_queue_capacity: usize,

    /// Capacity of each table actor's inbox.
    pub inbox_capacity: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            starting_stack: 100,
            client_queue_capacity: 256,
            inbox_capacity: 100,
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.starting_stack <= 0 {
            return Err("Starting stack must be positive".to_string());
        }

        if self.client_queue_capacity == 0 {
            return Err("Client queue capacity must be positive".to_string());
        }

        if self.inbox_capacity == 0 {
            return Err("Table inbox capacity must be positive".to_string());
        }

        Ok(())
    }
}
