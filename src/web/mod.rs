//! Web API module for the token analyzer
//!
//! Serves the search endpoint, the latest analysis, the text export and a
//! WebSocket progress feed, plus the static browser UI.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod server;
pub mod websocket;

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::analysis::{AnalysisSlot, TokenAnalyzer};
use crate::config::Config;

use self::websocket::WsMessage;

/// Shared application state for all API handlers
#[derive(Clone)]
pub struct AppState {
    /// Search pipeline
    pub analyzer: Arc<TokenAnalyzer>,
    /// Analysis on display, guarded against stale responses
    pub slot: Arc<AnalysisSlot>,
    /// Application configuration
    pub config: Arc<Config>,
    /// Broadcast channel for WebSocket messages
    pub ws_tx: broadcast::Sender<WsMessage>,
}

impl AppState {
    pub fn new(analyzer: Arc<TokenAnalyzer>, config: Arc<Config>) -> Self {
        let (ws_tx, _) = broadcast::channel(100);

        Self {
            analyzer,
            slot: Arc::new(AnalysisSlot::new()),
            config,
            ws_tx,
        }
    }

    /// Get a new receiver for WebSocket messages
    pub fn subscribe_ws(&self) -> broadcast::Receiver<WsMessage> {
        self.ws_tx.subscribe()
    }

    /// Broadcast a message to all WebSocket clients
    pub fn broadcast(&self, msg: WsMessage) {
        // No subscribers is fine
        let _ = self.ws_tx.send(msg);
    }
}
