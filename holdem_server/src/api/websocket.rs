//! WebSocket handler for real-time table play.
//!
//! Each connection runs two pumps. The write pump drains the client's
//! outbound queue into text frames and sends periodic pings; the read pump
//! decodes inbound envelopes and forwards them to the table. A peer that
//! stops answering pings is dropped after `pong_wait`.

use axum::{
    body::Bytes,
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use holdem::{
    GameMessage, HubError,
    entities::Username,
    table::{ClientLink, Connection},
};
use serde::Deserialize;
use tokio::{
    sync::mpsc,
    time::{Instant, interval_at, timeout, timeout_at},
};

use super::AppState;
use crate::{
    config::KeepaliveConfig,
    logging::{log_connection_event, log_keepalive_timeout},
};

/// Query parameters for the WebSocket upgrade.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    pub username: String,
}

/// WebSocket upgrade handler.
///
/// # Example
///
/// ```javascript
/// const ws = new WebSocket('ws://localhost:6969/ws/table-1?username=alice');
/// ws.onmessage = (event) => console.log(JSON.parse(event.data));
/// ws.send(JSON.stringify({ type: 'action', data: 'call' }));
/// ```
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(table_id): Path<String>,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    if Username::new(&query.username).is_empty() {
        return (StatusCode::BAD_REQUEST, "username is required").into_response();
    }

    let max_message_size = state.keepalive.max_message_size;
    ws.max_message_size(max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, table_id, query.username, state))
}

async fn handle_socket(
    mut socket: WebSocket,
    table_id: String,
    username: String,
    state: AppState,
) {
    let keepalive = state.keepalive;

    let connection = match state.hub.connect(&table_id, &username).await {
        Ok(connection) => connection,
        Err(err) => {
            log_connection_event("rejected", &table_id, &username, &err.to_string());
            let _ = timeout(keepalive.write_wait, socket.send(Message::Close(None))).await;
            return;
        }
    };
    log_connection_event("connected", &table_id, &username, "WebSocket established");

    let Connection {
        client_id,
        outbound,
        link,
    } = connection;
    let (sender, receiver) = socket.split();

    let mut write_task = tokio::spawn(write_pump(
        sender,
        outbound,
        keepalive,
        table_id.clone(),
        username.clone(),
    ));

    let writer_done = tokio::select! {
        _ = read_pump(receiver, &link, keepalive, &table_id, &username) => false,
        _ = &mut write_task => true,
    };

    link.leave().await;

    // The lobby drops the client's queue on unregister, which lets the writer
    // send its close frame and finish.
    if !writer_done && timeout(keepalive.write_wait, &mut write_task).await.is_err() {
        write_task.abort();
    }

    tracing::debug!(%client_id, "connection pumps stopped");
    log_connection_event("disconnected", &table_id, &username, "WebSocket closed");
}

async fn read_pump(
    mut receiver: SplitStream<WebSocket>,
    link: &ClientLink,
    keepalive: KeepaliveConfig,
    table_id: &str,
    username: &str,
) {
    let mut deadline = Instant::now() + keepalive.pong_wait;

    loop {
        let frame = match timeout_at(deadline, receiver.next()).await {
            Err(_) => {
                log_keepalive_timeout(table_id, username, "pong");
                return;
            }
            Ok(None) => return,
            Ok(Some(Err(err))) => {
                tracing::debug!(table_id, username, "read error: {}", err);
                return;
            }
            Ok(Some(Ok(frame))) => frame,
        };

        match frame {
            Message::Text(text) => match serde_json::from_str::<GameMessage>(text.as_str()) {
                Ok(message) => {
                    if let Err(HubError::TableClosed(_)) = link.forward(message).await {
                        return;
                    }
                }
                Err(err) => {
                    tracing::warn!(table_id, username, "undecodable message: {}", err);
                }
            },
            Message::Pong(_) => {
                deadline = Instant::now() + keepalive.pong_wait;
            }
            Message::Close(_) => return,
            _ => {}
        }
    }
}

async fn write_pump(
    mut sender: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<GameMessage>,
    keepalive: KeepaliveConfig,
    table_id: String,
    username: String,
) {
    let mut ping = interval_at(Instant::now() + keepalive.ping_period, keepalive.ping_period);

    loop {
        let frame = tokio::select! {
            message = outbound.recv() => match message {
                Some(message) => match serde_json::to_string(&message) {
                    Ok(json) => Message::Text(json.into()),
                    Err(err) => {
                        tracing::error!(%table_id, %username, "failed to encode message: {}", err);
                        continue;
                    }
                },
                None => {
                    let _ = timeout(keepalive.write_wait, sender.send(Message::Close(None))).await;
                    return;
                }
            },
            _ = ping.tick() => Message::Ping(Bytes::new()),
        };

        match timeout(keepalive.write_wait, sender.send(frame)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::debug!(%table_id, %username, "write error: {}", err);
                return;
            }
            Err(_) => {
                log_keepalive_timeout(&table_id, &username, "write");
                return;
            }
        }
    }
}
