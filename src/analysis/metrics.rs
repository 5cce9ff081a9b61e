//! Metric derivation over the pairs of a single token.

use tracing::{debug, warn};

use crate::error::AnalyzerError;
use crate::models::{HighestVolumePair, PairRecord, PairTotals, TokenMetrics};

/// Price used for a missing price when looking for the maximum.
const MISSING_PRICE_FOR_MAX: f64 = 0.0;
/// Price used for a missing price when looking for the minimum.
const MISSING_PRICE_FOR_MIN: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct MetricsDeriver {
    target_network: String,
}

impl MetricsDeriver {
    pub fn new(target_network: &str) -> Self {
        Self {
            target_network: target_network.to_string(),
        }
    }

    pub fn target_network(&self) -> &str {
        &self.target_network
    }

    /// Pairs on the target network whose base symbol equals `symbol`, ignoring case.
    /// Input order is kept.
    pub fn filter<'a>(&self, symbol: &str, pairs: &'a [PairRecord]) -> Vec<&'a PairRecord> {
        let wanted = symbol.to_lowercase();
        pairs
            .iter()
            .filter(|p| p.chain_id == self.target_network && p.base_symbol.to_lowercase() == wanted)
            .collect()
    }

    pub fn derive(&self, symbol: &str, pairs: &[PairRecord]) -> Result<TokenMetrics, AnalyzerError> {
        let matched = self.filter(symbol, pairs);
        debug!(
            "{} of {} pairs match {} on {}",
            matched.len(),
            pairs.len(),
            symbol,
            self.target_network
        );

        let primary = match matched.first() {
            Some(p) => *p,
            None => {
                return Err(AnalyzerError::NoMatch {
                    symbol: symbol.to_string(),
                    network: self.target_network.clone(),
                })
            }
        };

        let totals = sum_totals(&matched);
        let highest = highest_volume(&matched);

        Ok(TokenMetrics {
            token_symbol: primary.base_symbol.clone(),
            token_name: primary.base_name.clone().unwrap_or_else(|| symbol.to_string()),
            token_address: primary.base_address.clone(),
            network: self.target_network.clone(),
            pair_count: matched.len(),
            current_price: primary.price_usd.unwrap_or(0.0),
            buy_pressure_ratio: totals.total_buys as f64 / totals.total_sells.max(1) as f64,
            liquidity_concentration: primary.liquidity_usd / totals.total_liquidity.max(1.0),
            volume_liquidity_ratio: totals.total_volume / totals.total_liquidity.max(1.0),
            price_deviation: price_deviation(&matched),
            highest_volume_pair: HighestVolumePair {
                pair: highest.pair_label(),
                volume: highest.volume_h24,
            },
            totals,
        })
    }
}

fn sum_totals(pairs: &[&PairRecord]) -> PairTotals {
    pairs.iter().fold(PairTotals::default(), |mut acc, p| {
        acc.total_volume += p.volume_h24;
        acc.total_liquidity += p.liquidity_usd;
        acc.total_buys += p.buys_h24;
        acc.total_sells += p.sells_h24;
        acc
    })
}

/// First pair holding the maximum 24h volume. Caller guarantees `pairs` is non-empty.
fn highest_volume<'a>(pairs: &[&'a PairRecord]) -> &'a PairRecord {
    let mut highest = pairs[0];
    for &current in &pairs[1..] {
        if current.volume_h24 > highest.volume_h24 {
            highest = current;
        }
    }
    highest
}

/// `max / min - 1` across pair prices, 0 for a single pair.
///
/// A missing price counts as 0 for the maximum but 1 for the minimum, so an
/// unpriced pair pulls the deviation toward zero instead of blowing it up.
fn price_deviation(pairs: &[&PairRecord]) -> f64 {
    if pairs.len() < 2 {
        return 0.0;
    }

    let max = pairs
        .iter()
        .map(|p| p.price_usd.unwrap_or(MISSING_PRICE_FOR_MAX))
        .fold(f64::NEG_INFINITY, f64::max);
    let min = pairs
        .iter()
        .map(|p| p.price_usd.unwrap_or(MISSING_PRICE_FOR_MIN))
        .fold(f64::INFINITY, f64::min);

    if min <= 0.0 {
        warn!("Minimum pair price is {}, reporting zero price deviation", min);
        return 0.0;
    }

    max / min - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pair::test_pair;

    fn priced(symbol: &str, volume: f64, liquidity: f64, price: Option<f64>, buys: u64, sells: u64) -> PairRecord {
        PairRecord {
            volume_h24: volume,
            liquidity_usd: liquidity,
            price_usd: price,
            buys_h24: buys,
            sells_h24: sells,
            ..test_pair("base", symbol)
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_end_to_end_pepe_scenario() {
        let pairs = vec![
            priced("PEPE", 100.0, 50.0, Some(0.0001), 10, 5),
            priced("PEPE", 300.0, 150.0, Some(0.00012), 20, 5),
        ];
        let metrics = MetricsDeriver::new("base").derive("PEPE", &pairs).unwrap();

        assert!(approx(metrics.totals.total_volume, 400.0));
        assert!(approx(metrics.totals.total_liquidity, 200.0));
        assert_eq!(metrics.totals.total_buys, 30);
        assert_eq!(metrics.totals.total_sells, 10);
        assert!(approx(metrics.buy_pressure_ratio, 3.0));
        assert!(approx(metrics.liquidity_concentration, 0.25));
        assert!(approx(metrics.volume_liquidity_ratio, 2.0));
        assert!(approx(metrics.price_deviation, 0.2));
        assert!(approx(metrics.current_price, 0.0001));
        assert_eq!(metrics.highest_volume_pair.pair, "PEPE/WETH");
        assert!(approx(metrics.highest_volume_pair.volume, 300.0));
        assert_eq!(metrics.pair_count, 2);
        assert_eq!(metrics.token_name, "PEPE Token");
    }

    #[test]
    fn test_filter_is_case_insensitive_and_network_exact() {
        let pairs = vec![test_pair("base", "pepe"), test_pair("other", "PEPE")];
        let deriver = MetricsDeriver::new("base");
        let matched = deriver.filter("PEPE", &pairs);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].chain_id, "base");
    }

    #[test]
    fn test_filter_is_exact_symbol_not_substring() {
        let pairs = vec![test_pair("base", "PEPE2"), test_pair("base", "PEP")];
        assert!(MetricsDeriver::new("base").filter("PEPE", &pairs).is_empty());
    }

    #[test]
    fn test_network_match_is_case_sensitive() {
        let pairs = vec![test_pair("Base", "PEPE")];
        assert!(MetricsDeriver::new("base").filter("PEPE", &pairs).is_empty());
    }

    #[test]
    fn test_no_match_is_an_error() {
        let pairs = vec![test_pair("ethereum", "PEPE")];
        match MetricsDeriver::new("base").derive("PEPE", &pairs) {
            Err(AnalyzerError::NoMatch { symbol, network }) => {
                assert_eq!(symbol, "PEPE");
                assert_eq!(network, "base");
            }
            other => panic!("expected NoMatch, got {:?}", other),
        }
        assert!(MetricsDeriver::new("base").derive("PEPE", &[]).is_err());
    }

    #[test]
    fn test_zero_sells_ratio_equals_buys() {
        let pairs = vec![priced("PEPE", 0.0, 0.0, None, 7, 0), priced("PEPE", 0.0, 0.0, None, 5, 0)];
        let metrics = MetricsDeriver::new("base").derive("pepe", &pairs).unwrap();
        assert!(approx(metrics.buy_pressure_ratio, 12.0));
        assert!(metrics.buy_pressure_ratio >= 0.0);
    }

    #[test]
    fn test_zero_liquidity_floors_denominator() {
        let pairs = vec![priced("PEPE", 250.0, 0.0, Some(1.0), 0, 0)];
        let metrics = MetricsDeriver::new("base").derive("PEPE", &pairs).unwrap();
        assert!(approx(metrics.liquidity_concentration, 0.0));
        assert!(approx(metrics.volume_liquidity_ratio, 250.0));
    }

    #[test]
    fn test_single_pair_has_no_deviation() {
        let pairs = vec![priced("PEPE", 1.0, 1.0, Some(0.5), 1, 1)];
        let metrics = MetricsDeriver::new("base").derive("PEPE", &pairs).unwrap();
        assert_eq!(metrics.price_deviation, 0.0);
    }

    #[test]
    fn test_highest_volume_tie_keeps_first() {
        let mut first = priced("PEPE", 500.0, 0.0, None, 0, 0);
        first.quote_symbol = "WETH".to_string();
        let mut second = priced("PEPE", 500.0, 0.0, None, 0, 0);
        second.quote_symbol = "USDC".to_string();
        let lower = priced("PEPE", 10.0, 0.0, None, 0, 0);

        let metrics = MetricsDeriver::new("base")
            .derive("PEPE", &[lower, first, second])
            .unwrap();
        assert_eq!(metrics.highest_volume_pair.pair, "PEPE/WETH");
    }

    #[test]
    fn test_primary_pair_is_first_match_not_largest() {
        let pairs = vec![
            test_pair("ethereum", "PEPE"),
            priced("PEPE", 1.0, 10.0, Some(0.002), 0, 0),
            priced("PEPE", 1000.0, 90.0, Some(0.003), 0, 0),
        ];
        let metrics = MetricsDeriver::new("base").derive("PEPE", &pairs).unwrap();
        assert!(approx(metrics.current_price, 0.002));
        assert!(approx(metrics.liquidity_concentration, 0.1));
    }

    #[test]
    fn test_missing_price_asymmetry_is_pinned() {
        // Missing price reads as 0 for the max and 1 for the min:
        // max(0.5, 0) / min(0.5, 1) - 1 == 0
        let pairs = vec![
            priced("PEPE", 0.0, 0.0, Some(0.5), 0, 0),
            priced("PEPE", 0.0, 0.0, None, 0, 0),
        ];
        let metrics = MetricsDeriver::new("base").derive("PEPE", &pairs).unwrap();
        assert!(approx(metrics.price_deviation, 0.0));

        // With a price above 1 the missing pair becomes the minimum.
        let pairs = vec![
            priced("PEPE", 0.0, 0.0, Some(3.0), 0, 0),
            priced("PEPE", 0.0, 0.0, None, 0, 0),
        ];
        let metrics = MetricsDeriver::new("base").derive("PEPE", &pairs).unwrap();
        assert!(approx(metrics.price_deviation, 2.0));
    }

    #[test]
    fn test_zero_price_does_not_produce_infinity() {
        let pairs = vec![
            priced("PEPE", 0.0, 0.0, Some(0.0), 0, 0),
            priced("PEPE", 0.0, 0.0, Some(0.2), 0, 0),
        ];
        let metrics = MetricsDeriver::new("base").derive("PEPE", &pairs).unwrap();
        assert_eq!(metrics.price_deviation, 0.0);
    }

    #[test]
    fn test_missing_name_falls_back_to_query_symbol() {
        let mut pair = test_pair("base", "PEPE");
        pair.base_name = None;
        let metrics = MetricsDeriver::new("base").derive("pepe", &[pair]).unwrap();
        assert_eq!(metrics.token_name, "pepe");
        assert_eq!(metrics.token_symbol, "PEPE");
    }
}
