//! WebSocket push channel for displays and tablets.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws`
//! 2. Server immediately sends the current snapshot
//! 3. Every published change is pushed as a new snapshot
//! 4. Clients may send tagged commands; only rejections get a direct reply,
//!    successes arrive through the next push
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://studio-pc:3001/ws');
//!
//! ws.onmessage = (event) => {
//!   const data = JSON.parse(event.data);
//!   if (data.error) {
//!     showError(data.error);
//!   } else {
//!     render(data.game, data.timer);
//!   }
//! };
//!
//! ws.send(JSON.stringify({ type: "reveal_question", question_number: 2 }));
//! ```

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use quiz_poker::gateway::{Command, Snapshot};
use std::sync::atomic::Ordering;

use super::{AppState, game::error_response};
use crate::{logging, metrics};

/// WebSocket upgrade handler.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

fn encode(snapshot: &Snapshot) -> Option<Message> {
    match serde_json::to_string(snapshot) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            error!("Failed to serialize snapshot: {}", e);
            None
        }
    }
}

/// Handle an established WebSocket connection.
///
/// A send task forwards published snapshots and command rejections; the
/// current task reads client messages until the socket closes.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let active = state.connections.fetch_add(1, Ordering::SeqCst) + 1;
    metrics::websocket_connections_active(active);
    logging::log_connection("connected", active);

    let mut updates = state.handle.subscribe();
    let (response_tx, mut response_rx) = tokio::sync::mpsc::channel::<String>(32);

    let send_task = tokio::spawn(async move {
        let current = updates.borrow_and_update().clone();
        if let Some(message) = encode(&current)
            && sender.send(message).await.is_err()
        {
            return;
        }

        loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        info!("Game gateway closed, ending push");
                        break;
                    }
                    let snapshot = updates.borrow_and_update().clone();
                    if let Some(message) = encode(&snapshot)
                        && sender.send(message).await.is_err()
                    {
                        break;
                    }
                }
                Some(response_json) = response_rx.recv() => {
                    if sender.send(Message::Text(response_json.into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let command = match serde_json::from_str::<Command>(&text) {
                    Ok(command) => command,
                    Err(e) => {
                        warn!("Failed to parse client message: {}", e);
                        let body = serde_json::json!({
                            "error": "Invalid message format",
                            "kind": "validation",
                        });
                        let _ = response_tx.send(body.to_string()).await;
                        continue;
                    }
                };

                let name = command.name();
                let result = state.handle.execute(command).await;
                metrics::record_command(name, &result);
                if let Err(e) = result {
                    logging::log_command(name, None, Some(&e.to_string()));
                    let (_, body) = error_response(&e);
                    if let Ok(json) = serde_json::to_string(&body.0)
                        && response_tx.send(json).await.is_err()
                    {
                        break;
                    }
                } else {
                    logging::log_command(name, None, None);
                }
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    send_task.abort();

    let active = state.connections.fetch_sub(1, Ordering::SeqCst) - 1;
    metrics::websocket_connections_active(active);
    logging::log_connection("disconnected", active);
}
