//! Structured logging configuration.
//!
//! The library crate logs through the `log` facade; those records are bridged
//! into `tracing` so everything ends up in one subscriber.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize structured logging
///
/// Log levels are configurable via the RUST_LOG env var. Calling this more
/// than once is harmless; only the first subscriber is installed.
///
/// # Example
///
/// ```no_run
/// use holdem_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    // `try_init` also installs the `log` -> `tracing` bridge.
    let installed = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Structured logging initialized");
    }
}

/// Log a connection lifecycle event with structured fields
///
/// # Example
///
/// ```
/// use holdem_server::logging::log_connection_event;
///
/// log_connection_event("connected", "table-1", "alice", "WebSocket established");
/// ```
pub fn log_connection_event(event: &str, table_id: &str, username: &str, message: &str) {
    tracing::info!(
        event = event,
        table_id = table_id,
        username = username,
        "{}",
        message
    );
}

/// Log a connection dropped for missing its keepalive or write deadline
pub fn log_keepalive_timeout(table_id: &str, username: &str, what: &str) {
    tracing::warn!(
        table_id = table_id,
        username = username,
        "KEEPALIVE: {} timed out",
        what
    );
}
