//! DexScreener search client
//!
//! Wraps the public `/latest/dex/search` endpoint and turns its loosely typed
//! pair objects into [`PairRecord`]s. All defaulting of missing fields happens here.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::PairSource;
use crate::error::AnalyzerError;
use crate::models::PairRecord;

// ============================================================================
// Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub pairs: Option<Vec<DexPair>>,
}

/// A pair exactly as DexScreener returns it. Every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexPair {
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub base_token: Option<DexToken>,
    #[serde(default)]
    pub quote_token: Option<DexToken>,
    #[serde(default)]
    pub price_usd: Option<Value>, // Usually a decimal string
    #[serde(default)]
    pub volume: Option<DexVolume>,
    #[serde(default)]
    pub liquidity: Option<DexLiquidity>,
    #[serde(default)]
    pub txns: Option<DexTxns>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DexToken {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DexVolume {
    #[serde(default)]
    pub h24: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DexLiquidity {
    #[serde(default)]
    pub usd: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DexTxns {
    #[serde(default)]
    pub h24: Option<DexTxnCounts>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DexTxnCounts {
    #[serde(default)]
    pub buys: Option<Value>,
    #[serde(default)]
    pub sells: Option<Value>,
}

/// Reads a number that may arrive as a string or a bare number.
/// Anything unparsable or non-finite yields `None`.
fn parse_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// USD amounts; negative values are treated as missing.
fn parse_amount(value: Option<&Value>) -> f64 {
    parse_number(value).filter(|v| *v >= 0.0).unwrap_or(0.0)
}

/// Transaction counts must be whole and non-negative, otherwise 0.
fn parse_count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) if n.is_u64() => n.as_u64().unwrap_or(0),
        other => parse_number(other)
            .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= u64::MAX as f64)
            .map(|v| v as u64)
            .unwrap_or(0),
    }
}

impl From<DexPair> for PairRecord {
    fn from(pair: DexPair) -> Self {
        let base = pair.base_token.unwrap_or_default();
        let quote = pair.quote_token.unwrap_or_default();
        let counts = pair.txns.and_then(|t| t.h24).unwrap_or_default();

        PairRecord {
            chain_id: pair.chain_id.unwrap_or_default(),
            price_usd: parse_number(pair.price_usd.as_ref()),
            base_symbol: base.symbol.unwrap_or_default(),
            base_name: base.name.filter(|n| !n.trim().is_empty()),
            base_address: base.address,
            quote_symbol: quote.symbol.unwrap_or_default(),
            volume_h24: parse_amount(pair.volume.and_then(|v| v.h24).as_ref()),
            liquidity_usd: parse_amount(pair.liquidity.and_then(|l| l.usd).as_ref()),
            buys_h24: parse_count(counts.buys.as_ref()),
            sells_h24: parse_count(counts.sells.as_ref()),
        }
    }
}

// ============================================================================
// DexScreener Client
// ============================================================================

#[derive(Debug, Clone)]
pub struct DexScreenerClient {
    base_url: String,
    client: Client,
}

impl DexScreenerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AnalyzerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalyzerError::ConfigError(format!("HTTP client for DexScreener: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Raw search; returns the pairs in upstream order.
    pub async fn search_raw(&self, query: &str) -> Result<Vec<DexPair>, AnalyzerError> {
        let url = format!("{}/latest/dex/search/", self.base_url);
        debug!("Searching DexScreener for {}: {}", query, url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| AnalyzerError::FetchFailure(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("DexScreener search error for {}: {} - {}", query, status, error_text);
            return Err(AnalyzerError::FetchFailure(format!("HTTP {}: {}", status, error_text)));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError::FetchFailure(format!("invalid response body: {}", e)))?;

        let pairs = body.pairs.unwrap_or_default();
        debug!("DexScreener returned {} pairs for {}", pairs.len(), query);
        Ok(pairs)
    }
}

#[async_trait]
impl PairSource for DexScreenerClient {
    async fn search(&self, query: &str) -> Result<Vec<PairRecord>, AnalyzerError> {
        let pairs = self.search_raw(query).await?;
        Ok(pairs.into_iter().map(PairRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const SEARCH_BODY: &str = r#"{
        "schemaVersion": "1.0.0",
        "pairs": [
            {
                "chainId": "base",
                "pairAddress": "0xabc",
                "baseToken": { "address": "0xpepe", "name": "Pepe", "symbol": "PEPE" },
                "quoteToken": { "address": "0xweth", "name": "Wrapped Ether", "symbol": "WETH" },
                "priceUsd": "0.00012",
                "txns": { "h24": { "buys": 20, "sells": 5 } },
                "volume": { "h24": 300.5 },
                "liquidity": { "usd": 150.0 }
            },
            {
                "chainId": "ethereum",
                "baseToken": { "symbol": "PEPE" }
            }
        ]
    }"#;

    #[test]
    fn test_missing_fields_default_at_the_edge() {
        let record = PairRecord::from(DexPair::default());
        assert_eq!(record.chain_id, "");
        assert_eq!(record.base_symbol, "");
        assert!(record.base_name.is_none());
        assert_eq!(record.volume_h24, 0.0);
        assert_eq!(record.liquidity_usd, 0.0);
        assert_eq!(record.buys_h24, 0);
        assert_eq!(record.sells_h24, 0);
        assert!(record.price_usd.is_none());
    }

    #[test]
    fn test_number_parsing() {
        assert_eq!(parse_number(Some(&Value::String("0.0001".into()))), Some(0.0001));
        assert_eq!(parse_number(Some(&serde_json::json!(2.5))), Some(2.5));
        assert_eq!(parse_number(Some(&Value::String("n/a".into()))), None);
        assert_eq!(parse_number(Some(&Value::String("NaN".into()))), None);
        assert_eq!(parse_number(Some(&Value::Null)), None);
        assert_eq!(parse_number(None), None);
    }

    #[test]
    fn test_malformed_numbers_default_to_zero() {
        let pair: DexPair = serde_json::from_str(
            r#"{
                "chainId": "base",
                "baseToken": { "symbol": "PEPE" },
                "volume": { "h24": "300.5" },
                "liquidity": { "usd": -10 },
                "txns": { "h24": { "buys": 2.5, "sells": -3 } }
            }"#,
        )
        .unwrap();
        let record = PairRecord::from(pair);
        assert_eq!(record.volume_h24, 300.5);
        assert_eq!(record.liquidity_usd, 0.0);
        assert_eq!(record.buys_h24, 0);
        assert_eq!(record.sells_h24, 0);
    }

    #[test]
    fn test_counts_accept_whole_numbers_in_any_form() {
        assert_eq!(parse_count(Some(&serde_json::json!(12))), 12);
        assert_eq!(parse_count(Some(&serde_json::json!(12.0))), 12);
        assert_eq!(parse_count(Some(&Value::String("7".into()))), 7);
        assert_eq!(parse_count(Some(&Value::String("lots".into()))), 0);
        assert_eq!(parse_count(None), 0);
    }

    #[tokio::test]
    async fn test_one_bad_pair_does_not_fail_the_search() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/latest/dex/search/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"pairs":[
                    {"chainId":"base","baseToken":{"symbol":"PEPE"},"txns":{"h24":{"buys":-1,"sells":"x"}},"volume":{"h24":"n/a"}},
                    {"chainId":"base","baseToken":{"symbol":"PEPE"},"txns":{"h24":{"buys":4,"sells":2}},"volume":{"h24":50}}
                ]}"#,
            )
            .create_async()
            .await;

        let client = DexScreenerClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let pairs = client.search("PEPE").await.unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].buys_h24, 0);
        assert_eq!(pairs[0].volume_h24, 0.0);
        assert_eq!(pairs[1].buys_h24, 4);
        assert_eq!(pairs[1].volume_h24, 50.0);
    }

    #[tokio::test]
    async fn test_search_parses_pairs_in_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/latest/dex/search/")
            .match_query(Matcher::UrlEncoded("q".into(), "PEPE".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SEARCH_BODY)
            .create_async()
            .await;

        let client = DexScreenerClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let pairs = client.search("PEPE").await.unwrap();

        mock.assert_async().await;
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].chain_id, "base");
        assert_eq!(pairs[0].pair_label(), "PEPE/WETH");
        assert_eq!(pairs[0].base_name.as_deref(), Some("Pepe"));
        assert_eq!(pairs[0].buys_h24, 20);
        assert_eq!(pairs[0].price_usd, Some(0.00012));
        assert_eq!(pairs[1].chain_id, "ethereum");
        assert_eq!(pairs[1].volume_h24, 0.0);
    }

    #[tokio::test]
    async fn test_null_pairs_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/latest/dex/search/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"schemaVersion":"1.0.0","pairs":null}"#)
            .create_async()
            .await;

        let client = DexScreenerClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        assert!(client.search("NOPE").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/latest/dex/search/")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let client = DexScreenerClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        match client.search("PEPE").await {
            Err(AnalyzerError::FetchFailure(msg)) => assert!(msg.contains("429")),
            other => panic!("expected FetchFailure, got {:?}", other),
        }
    }
}
