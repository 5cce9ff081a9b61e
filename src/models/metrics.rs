use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw sums over the filtered pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairTotals {
    pub total_volume: f64,
    pub total_liquidity: f64,
    pub total_buys: u64,
    pub total_sells: u64,
}

impl PairTotals {
    pub fn total_transactions(&self) -> u64 {
        self.total_buys + self.total_sells
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighestVolumePair {
    pub pair: String,   // "BASE/QUOTE"
    pub volume: f64,
}

/// Indicators derived from the pairs of one symbol on one network.
/// Owns all of its data; the source pairs can be dropped once this exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetrics {
    pub token_symbol: String,
    pub token_name: String,
    pub token_address: Option<String>,
    pub network: String,
    pub pair_count: usize,
    pub current_price: f64,
    pub buy_pressure_ratio: f64,
    pub liquidity_concentration: f64,
    pub volume_liquidity_ratio: f64,
    pub price_deviation: f64,
    pub highest_volume_pair: HighestVolumePair,
    pub totals: PairTotals,
}

/// A completed search: metrics plus the narrative generated from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAnalysis {
    pub symbol: String,
    pub metrics: TokenMetrics,
    pub analysis: String,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
pub(crate) fn test_analysis(symbol: &str, text: &str) -> TokenAnalysis {
    TokenAnalysis {
        symbol: symbol.to_string(),
        metrics: TokenMetrics {
            token_symbol: symbol.to_string(),
            token_name: symbol.to_string(),
            token_address: None,
            network: "base".to_string(),
            pair_count: 1,
            current_price: 1.0,
            buy_pressure_ratio: 1.0,
            liquidity_concentration: 1.0,
            volume_liquidity_ratio: 1.0,
            price_deviation: 0.0,
            highest_volume_pair: HighestVolumePair {
                pair: format!("{}/WETH", symbol),
                volume: 0.0,
            },
            totals: PairTotals::default(),
        },
        analysis: text.to_string(),
        generated_at: Utc::now(),
    }
}
