//! API route definitions

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;
use super::websocket::ws_handler;
use super::AppState;

/// Create all API routes
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/api/health", get(handlers::health_check))

        // Token analysis
        .route("/api/analyze", post(handlers::analyze_token))
        .route("/api/analysis/latest", get(handlers::get_latest_analysis))
        .route("/api/analysis/export", get(handlers::export_analysis))

        // WebSocket
        .route("/ws", get(ws_handler))

        // Add state to all routes
        .with_state(state)
}
