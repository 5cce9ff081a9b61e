//! Prompt rendering and the narrative round trip.

use std::sync::Arc;
use tracing::{error, info};

use crate::api::TextCompleter;
use crate::error::AnalyzerError;
use crate::models::{PairTotals, TokenMetrics};

pub struct NarrativeRequester {
    completer: Arc<dyn TextCompleter>,
}

impl NarrativeRequester {
    pub fn new(completer: Arc<dyn TextCompleter>) -> Self {
        Self { completer }
    }

    /// One blocking round trip. The model text is returned as is.
    pub async fn request_narrative(
        &self,
        symbol: &str,
        metrics: &TokenMetrics,
        totals: &PairTotals,
    ) -> Result<String, AnalyzerError> {
        let system = system_prompt(&metrics.network);
        let prompt = build_prompt(symbol, metrics, totals);

        match self.completer.complete(&system, &prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                info!("Received {} character analysis for {}", text.len(), symbol);
                Ok(text)
            }
            Ok(_) => {
                error!("Empty analysis returned for {}", symbol);
                Err(AnalyzerError::NarrativeUnavailable(
                    "completion returned no text".to_string(),
                ))
            }
            Err(e) => {
                error!("Analysis request for {} failed: {}", symbol, e);
                Err(match e {
                    AnalyzerError::NarrativeUnavailable(_) => e,
                    other => AnalyzerError::NarrativeUnavailable(other.to_string()),
                })
            }
        }
    }
}

/// "base" -> "Base"
pub fn network_display_name(network: &str) -> String {
    let mut chars = network.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn system_prompt(network: &str) -> String {
    format!(
        "You are a cryptocurrency analyst specializing in meme tokens on the {} ecosystem. \
         Provide detailed, professional analysis based on the provided metrics. \
         Always end with exactly one recommendation from: strong sell, sell, hold, buy, strong buy.",
        network_display_name(network)
    )
}

pub fn build_prompt(symbol: &str, metrics: &TokenMetrics, totals: &PairTotals) -> String {
    let network = network_display_name(&metrics.network);
    format!(
        "Analyze the following MEME coin data on the {network} ecosystem and provide an in-depth technical analysis:

Token: {symbol}
Price: ${price:.8}
24h Volume: ${volume}
Liquidity: ${liquidity}
24h Transactions: {txns} ({buys} buys, {sells} sells)

Metrics:
Buy/Sell Pressure Ratio: {bpr:.2}
Liquidity Concentration: {lc:.2}
Volume/Liquidity Ratio: {vlr:.2}
Price Deviation: {dev:.2}%

Provide a detailed analysis of the token's performance, potential risks, and opportunities. Consider:
1. Market sentiment based on buy/sell ratio
2. Liquidity health and distribution
3. Trading volume relative to liquidity
4. Price arbitrage opportunities across pairs
5. Overall market dynamics on {network} ecosystem

End with a clear strong sell / sell / hold / buy / strong buy recommendation.",
        price = metrics.current_price,
        volume = format_grouped(totals.total_volume),
        liquidity = format_grouped(totals.total_liquidity),
        txns = totals.total_transactions(),
        buys = totals.total_buys,
        sells = totals.total_sells,
        bpr = metrics.buy_pressure_ratio,
        lc = metrics.liquidity_concentration,
        vlr = metrics.volume_liquidity_ratio,
        dev = metrics.price_deviation * 100.0,
    )
}

/// en-US style grouping: "1,234,567.891". At most three fraction digits,
/// trailing zeros dropped.
pub fn format_grouped(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    // Ties round away from zero, as toLocaleString does
    let rounded = (value.abs() * 1000.0).round() / 1000.0;
    let rendered = format!("{:.3}", rounded);
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}
