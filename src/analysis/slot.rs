//! Holder for the analysis currently on display.
//!
//! Every search takes a ticket from [`AnalysisSlot::begin`]. Only the newest
//! ticket may publish; a response that arrives after a newer search started is
//! dropped so it cannot overwrite fresher state.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::models::TokenAnalysis;

#[derive(Debug, Default)]
struct SlotState {
    latest: Option<TokenAnalysis>,
    published_id: u64,
    finished_id: u64,
}

#[derive(Debug, Default)]
pub struct AnalysisSlot {
    issued: AtomicU64,
    state: RwLock<SlotState>,
}

impl AnalysisSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new request id, strictly greater than all previous ones.
    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current_id(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Applies `analysis` if `request_id` is still the newest search.
    /// Returns whether the slot was updated.
    pub async fn publish(&self, request_id: u64, analysis: TokenAnalysis) -> bool {
        let mut state = self.state.write().await;
        self.mark_finished(&mut state, request_id);

        if request_id != self.current_id() {
            info!(
                "Discarding stale analysis for {} (request {}, newest {})",
                analysis.symbol,
                request_id,
                self.current_id()
            );
            return false;
        }

        debug!("Publishing analysis for {} (request {})", analysis.symbol, request_id);
        state.latest = Some(analysis);
        state.published_id = request_id;
        true
    }

    /// Records that a request ended without a result. The displayed analysis is kept.
    pub async fn fail(&self, request_id: u64) {
        let mut state = self.state.write().await;
        self.mark_finished(&mut state, request_id);
    }

    pub async fn latest(&self) -> Option<TokenAnalysis> {
        self.state.read().await.latest.clone()
    }

    /// Id of the request whose analysis is on display, 0 if none.
    pub async fn published_id(&self) -> u64 {
        self.state.read().await.published_id
    }

    /// True while the newest search has not finished.
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.finished_id < self.current_id()
    }

    fn mark_finished(&self, state: &mut SlotState, request_id: u64) {
        if request_id > state.finished_id {
            state.finished_id = request_id;
        }
    }
}
