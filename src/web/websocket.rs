//! WebSocket feed of search progress
//!
//! Lets the UI notice when a search it did not start (another tab, a retry)
//! replaces the analysis on display.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};

use super::AppState;

/// WebSocket message types broadcast to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all_fields = "camelCase")]
pub enum WsMessage {
    /// A search was accepted and is in flight
    AnalysisStarted {
        request_id: u64,
        symbol: String,
        timestamp: DateTime<Utc>,
    },

    /// A search finished; `applied` is false when a newer search superseded it
    AnalysisCompleted {
        request_id: u64,
        symbol: String,
        applied: bool,
        timestamp: DateTime<Utc>,
    },

    /// A search failed and the displayed analysis was left as it was
    AnalysisFailed {
        request_id: u64,
        symbol: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Heartbeat/ping message
    Ping {
        timestamp: DateTime<Utc>,
    },
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Forwards broadcast events until the client leaves. Clients only listen.
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut rx = state.subscribe_ws();
    info!("New WebSocket client connected");

    let ping = WsMessage::Ping {
        timestamp: Utc::now(),
    };
    if send_json(&mut socket, &ping).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            event = next_event(&mut rx) => match event {
                Some(msg) => {
                    if send_json(&mut socket, &msg).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
            },
        }
    }

    info!("WebSocket connection closed");
}

/// Next broadcast event. A client that fell behind skips ahead instead of
/// being dropped; `None` once the channel is closed.
async fn next_event(rx: &mut broadcast::Receiver<WsMessage>) -> Option<WsMessage> {
    loop {
        match rx.recv().await {
            Ok(msg) => return Some(msg),
            Err(RecvError::Lagged(skipped)) => {
                warn!("WebSocket client lagged, skipped {} messages", skipped);
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

async fn send_json(socket: &mut WebSocket, msg: &WsMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    socket.send(Message::Text(json)).await
}
