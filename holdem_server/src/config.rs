//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use holdem::{db::DatabaseConfig, table::TableConfig};
use std::{net::SocketAddr, str::FromStr, time::Duration};

pub const DEFAULT_BIND: &str = "127.0.0.1:6969";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration. Without one, table records live in memory.
    pub database: Option<DatabaseConfig>,
    /// Settings shared by every table
    pub table: TableConfig,
    /// WebSocket keepalive and framing limits
    pub keepalive: KeepaliveConfig,
}

/// Per-connection timing and size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepaliveConfig {
    /// Bound on every individual outbound write
    pub write_wait: Duration,
    /// A connection with no pong for this long is considered dead
    pub pong_wait: Duration,
    /// How often pings go out; always shorter than `pong_wait`
    pub ping_period: Duration,
    /// Largest inbound frame accepted, in bytes
    pub max_message_size: usize,
}

impl KeepaliveConfig {
    /// Derives the ping period as 9/10 of `pong_wait`.
    pub fn new(write_wait: Duration, pong_wait: Duration, max_message_size: usize) -> Self {
        Self {
            write_wait,
            pong_wait,
            ping_period: pong_wait * 9 / 10,
            max_message_size,
        }
    }
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), Duration::from_secs(60), 512)
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but can't be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(bind_override, database_url_override, |key| {
            std::env::var(key).ok()
        })
    }

    /// Same as [`ServerConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_or(&lookup, "SERVER_BIND", DEFAULT_BIND)?,
        };

        let database = database_url_override
            .or_else(|| lookup("DATABASE_URL"))
            .filter(|url| !url.is_empty())
            .map(DatabaseConfig::new);

        let defaults = TableConfig::default();
        let table = TableConfig {
            starting_stack: parse_or(&lookup, "TABLE_STARTING_STACK", defaults.starting_stack)?,
            client_queue_capacity: parse_or(
                &lookup,
                "CLIENT_QUEUE_CAPACITY",
                defaults.client_queue_capacity,
            )?,
            inbox_capacity: parse_or(&lookup, "TABLE_INBOX_CAPACITY", defaults.inbox_capacity)?,
        };

        let keepalive = KeepaliveConfig::new(
            Duration::from_secs(parse_or(&lookup, "WS_WRITE_WAIT_SECS", 10u64)?),
            Duration::from_secs(parse_or(&lookup, "WS_PONG_WAIT_SECS", 60u64)?),
            parse_or(&lookup, "WS_MAX_MESSAGE_SIZE", 512usize)?,
        );

        Ok(ServerConfig {
            bind,
            database,
            table,
            keepalive,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table.validate().map_err(|reason| ConfigError::Invalid {
            var: "TABLE_*".to_string(),
            reason,
        })?;

        if self.keepalive.write_wait.is_zero() {
            return Err(ConfigError::Invalid {
                var: "WS_WRITE_WAIT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.keepalive.ping_period.is_zero()
            || self.keepalive.ping_period >= self.keepalive.pong_wait
        {
            return Err(ConfigError::Invalid {
                var: "WS_PONG_WAIT_SECS".to_string(),
                reason: "Must be long enough for a ping period shorter than it".to_string(),
            });
        }

        if self.keepalive.max_message_size == 0 {
            return Err(ConfigError::Invalid {
                var: "WS_MAX_MESSAGE_SIZE".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parses `key` if it is set, falling back to `default` if it isn't.
fn parse_or<F, T, D>(lookup: &F, key: &str, default: D) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
    D: ToString,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var: key.to_string(),
        reason: format!("{raw:?}: {e}"),
    })
}
