//! Request handlers for all API endpoints

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{error, info, warn};

use super::models::*;
use super::websocket::WsMessage;
use super::AppState;
use crate::error::AnalyzerError;
use crate::export::ExportFile;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: &str, details: Option<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            details,
        }),
    )
}

impl From<AnalyzerError> for ApiError {
    fn from(e: AnalyzerError) -> Self {
        let status = match &e {
            AnalyzerError::InvalidSymbol(_) => StatusCode::BAD_REQUEST,
            AnalyzerError::NoMatch { .. } => StatusCode::NOT_FOUND,
            AnalyzerError::FetchFailure(_) | AnalyzerError::NarrativeUnavailable(_) => {
                StatusCode::BAD_GATEWAY
            }
            AnalyzerError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let details = match &e {
            AnalyzerError::FetchFailure(d)
            | AnalyzerError::NarrativeUnavailable(d)
            | AnalyzerError::InvalidSymbol(d)
            | AnalyzerError::ConfigError(d) => Some(d.clone()),
            AnalyzerError::NoMatch { .. } => None,
        };
        let headline = match &e {
            AnalyzerError::FetchFailure(_) => "Failed to fetch token data".to_string(),
            AnalyzerError::NarrativeUnavailable(_) => "Failed to generate analysis".to_string(),
            other => other.to_string(),
        };
        api_error(status, &headline, details)
    }
}

// ============================================================================
// Health Check
// ============================================================================

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        network: state.config.target_network.clone(),
        timestamp: Utc::now(),
    })
}

// ============================================================================
// Analysis
// ============================================================================

pub async fn analyze_token(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let symbol = req.symbol.trim().to_string();
    // Only real searches take a ticket; a rejected one must not supersede them
    if symbol.is_empty() {
        warn!("Rejected search with blank symbol");
        return Err(AnalyzerError::InvalidSymbol("symbol must not be empty".to_string()).into());
    }

    let request_id = state.slot.begin();
    info!("Search {} started for {}", request_id, symbol);
    state.broadcast(WsMessage::AnalysisStarted {
        request_id,
        symbol: symbol.clone(),
        timestamp: Utc::now(),
    });

    match state.analyzer.analyze(&symbol).await {
        Ok(analysis) => {
            let applied = state.slot.publish(request_id, analysis.clone()).await;
            state.broadcast(WsMessage::AnalysisCompleted {
                request_id,
                symbol,
                applied,
                timestamp: Utc::now(),
            });
            Ok(Json(AnalyzeResponse {
                request_id,
                applied,
                analysis,
            }))
        }
        Err(e) => {
            error!("Search {} for {} failed: {}", request_id, symbol, e);
            state.slot.fail(request_id).await;
            state.broadcast(WsMessage::AnalysisFailed {
                request_id,
                symbol,
                message: e.to_string(),
                timestamp: Utc::now(),
            });
            Err(e.into())
        }
    }
}

pub async fn get_latest_analysis(
    State(state): State<AppState>,
) -> Result<Json<LatestAnalysisResponse>, ApiError> {
    let is_loading = state.slot.is_loading().await;
    match state.slot.latest().await {
        Some(analysis) => Ok(Json(LatestAnalysisResponse {
            request_id: state.slot.published_id().await,
            is_loading,
            analysis,
        })),
        None => Err(api_error(StatusCode::NOT_FOUND, "No analysis available yet", None)),
    }
}

pub async fn export_analysis(State(state): State<AppState>) -> Result<Response, ApiError> {
    let latest = state.slot.latest().await;
    let file = latest
        .as_ref()
        .and_then(|a| ExportFile::from_analysis(&a.analysis, Utc::now()));

    match file {
        Some(file) => {
            info!("Exporting analysis as {}", file.filename);
            Ok((
                [
                    (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, file.content_disposition()),
                ],
                file.content,
            )
                .into_response())
        }
        None => {
            warn!("Export requested with no analysis on display");
            Err(api_error(StatusCode::NOT_FOUND, "Nothing to export", None))
        }
    }
}
