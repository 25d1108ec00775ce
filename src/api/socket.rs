//! WebSocket endpoints
//!
//! `/ws/tasks/status/` streams status change events to the client as JSON
//! text frames. A socket upgrade on any other path completes the handshake and
//! then closes straight away with [`NOT_FOUND_CLOSE_CODE`]. Plain HTTP
//! requests to unknown paths get an ordinary 404.

use std::borrow::Cow;

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        OriginalUri, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::api::AppState;
use crate::broadcast::BroadcastEvent;

/// Close code sent for unrecognised socket routes
pub const NOT_FOUND_CLOSE_CODE: u16 = 4004;

/// Handler for GET /ws/tasks/status/ (upgrade)
pub async fn status_socket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    // Join before the handshake completes so nothing published after the
    // client sees the upgrade is missed.
    let events = state.service.status_broadcast().subscribe();
    ws.on_upgrade(move |socket| forward_events(socket, events))
}

async fn forward_events(socket: WebSocket, mut events: broadcast::Receiver<BroadcastEvent>) {
    info!("Status subscriber connected");
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!("Dropping unserializable event: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Status subscriber lagged, {} event(s) skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Clients have nothing to say on this channel
                Some(Ok(_)) => {}
            },
        }
    }

    info!("Status subscriber disconnected");
}

/// Router fallback. Socket upgrades are accepted and closed as not found.
pub async fn not_found_socket_handler(
    OriginalUri(uri): OriginalUri,
    ws: Option<WebSocketUpgrade>,
) -> Response {
    let Some(ws) = ws else {
        return StatusCode::NOT_FOUND.into_response();
    };
    debug!("Rejecting socket connection to unknown route {}", uri.path());
    ws.on_upgrade(|mut socket| async move {
        let frame = CloseFrame {
            code: NOT_FOUND_CLOSE_CODE,
            reason: Cow::Borrowed("Not Found"),
        };
        if let Err(e) = socket.send(Message::Close(Some(frame))).await {
            debug!("Close frame not delivered: {}", e);
        }
    })
}
