//! Search pipeline: fetch pairs, derive metrics, request the narrative.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use super::{MetricsDeriver, NarrativeRequester};
use crate::api::{PairSource, TextCompleter};
use crate::error::AnalyzerError;
use crate::models::TokenAnalysis;

pub struct TokenAnalyzer {
    pairs: Arc<dyn PairSource>,
    deriver: MetricsDeriver,
    narrator: NarrativeRequester,
}

impl TokenAnalyzer {
    pub fn new(pairs: Arc<dyn PairSource>, completer: Arc<dyn TextCompleter>, target_network: &str) -> Self {
        Self {
            pairs,
            deriver: MetricsDeriver::new(target_network),
            narrator: NarrativeRequester::new(completer),
        }
    }

    pub fn target_network(&self) -> &str {
        self.deriver.target_network()
    }

    /// Runs one search end to end. Either every step succeeds or nothing is returned.
    pub async fn analyze(&self, symbol: &str) -> Result<TokenAnalysis, AnalyzerError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(AnalyzerError::InvalidSymbol("symbol must not be empty".to_string()));
        }

        info!("Analyzing {} on {}", symbol, self.target_network());

        let pairs = self.pairs.search(symbol).await?;
        let metrics = match self.deriver.derive(symbol, &pairs) {
            Ok(m) => m,
            Err(e) => {
                warn!("{}", e);
                return Err(e);
            }
        };
        drop(pairs);

        let analysis = self
            .narrator
            .request_narrative(symbol, &metrics, &metrics.totals)
            .await?;

        info!(
            "Analysis complete for {}: {} pairs, buy pressure {:.2}",
            symbol, metrics.pair_count, metrics.buy_pressure_ratio
        );

        Ok(TokenAnalysis {
            symbol: symbol.to_string(),
            metrics,
            analysis,
            generated_at: Utc::now(),
        })
    }
}
