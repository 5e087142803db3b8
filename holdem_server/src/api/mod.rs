//! HTTP/WebSocket API for the Hold'em server.
//!
//! # Endpoints Overview
//!
//! - `GET /ws/{table_id}?username=<name>` - Join a table over WebSocket
//! - `GET /health` - Server health status
//!
//! The username is trusted as-is: whoever sits in front of this server is
//! expected to have authenticated the player already.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use holdem_server::{api::{create_router, AppState}, config::KeepaliveConfig};
//! use holdem::{Hub, TableConfig, table::MemoryTableStore};
//! use std::sync::Arc;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let state = AppState {
//!     hub: Hub::new(Arc::new(MemoryTableStore::new()), TableConfig::default()),
//!     keepalive: KeepaliveConfig::default(),
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively. In production, configure appropriate
//! origins, methods, and headers.

pub mod websocket;

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Json},
    routing::get,
};
use holdem::Hub;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::config::KeepaliveConfig;

/// Application state shared across all HTTP handlers and WebSocket connections.
#[derive(Clone)]
pub struct AppState {
    pub hub: Hub,
    pub keepalive: KeepaliveConfig,
}

/// Create the API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws/{table_id}", get(websocket::websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"ok","tables":2}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let tables = state.hub.active_table_count().await;
    Json(json!({
        "status": "ok",
        "tables": tables,
    }))
}
