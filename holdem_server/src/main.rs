//! Multi-table Hold'em server using the async actor model.
//!
//! Tables are created on demand when the first player connects and retire
//! once their hand finishes or everyone leaves.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Error};
use holdem::{
    Hub,
    db::Database,
    table::{MemoryTableStore, TableStore},
};
use holdem_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging,
};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run a multi-table Texas Hold'em server

USAGE:
  holdem_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --db-url     URL         Database connection string  [default: env DATABASE_URL, in-memory if unset]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  TABLE_STARTING_STACK     Chips each player sits down with
  CLIENT_QUEUE_CAPACITY    Outbound messages buffered per connection
  TABLE_INBOX_CAPACITY     Events buffered per table
  WS_WRITE_WAIT_SECS       Bound on each outbound write
  WS_PONG_WAIT_SECS        Silence tolerated before a connection is dropped
  WS_MAX_MESSAGE_SIZE      Largest inbound frame, in bytes
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let bind: Option<SocketAddr> = pargs
        .opt_value_from_str("--bind")
        .context("Invalid --bind address")?;
    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;

    logging::init();

    let config = ServerConfig::from_env(bind, database_url)?;
    config.validate()?;

    info!("Starting Hold'em server at {}", config.bind);

    let store: Arc<dyn TableStore> = match &config.database {
        Some(db_config) => {
            info!("Connecting to database");
            let db = Database::new(db_config)
                .await
                .context("Failed to connect to database")?;
            db.health_check()
                .await
                .context("Database health check failed")?;
            info!("Database connected successfully");
            Arc::new(db.table_store())
        }
        None => {
            info!("No DATABASE_URL set, keeping table records in memory");
            Arc::new(MemoryTableStore::new())
        }
    };

    let state = AppState {
        hub: Hub::new(store, config.table.clone()),
        keepalive: config.keepalive,
    };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install CTRL+C signal handler: {}", err);
        std::future::pending::<()>().await;
    }
}
