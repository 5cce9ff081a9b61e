use serde::{Deserialize, Serialize};

/// A trading pair after boundary defaulting. Missing counters are already zero,
/// so nothing past the api layer has to reason about absent fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairRecord {
    pub chain_id: String,               // Network identifier, e.g. "base"
    pub base_symbol: String,
    pub base_name: Option<String>,      // None when the upstream name is missing or blank
    pub base_address: Option<String>,
    pub quote_symbol: String,
    pub volume_h24: f64,                // USD, 0 when missing
    pub liquidity_usd: f64,             // USD, 0 when missing
    pub buys_h24: u64,
    pub sells_h24: u64,
    pub price_usd: Option<f64>,         // None when missing or unparsable
}

impl PairRecord {
    /// "BASE/QUOTE" label used for the highest volume pair.
    pub fn pair_label(&self) -> String {
        format!("{}/{}", self.base_symbol, self.quote_symbol)
    }
}

#[cfg(test)]
pub(crate) fn test_pair(chain_id: &str, symbol: &str) -> PairRecord {
    PairRecord {
        chain_id: chain_id.to_string(),
        base_symbol: symbol.to_string(),
        base_name: Some(format!("{} Token", symbol)),
        base_address: None,
        quote_symbol: "WETH".to_string(),
        volume_h24: 0.0,
        liquidity_usd: 0.0,
        buys_h24: 0,
        sells_h24: 0,
        price_usd: None,
    }
}
