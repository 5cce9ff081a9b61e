use thiserror::Error;

/// Failures that end a token search. None of them leave a partial result behind.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Failed to fetch token data: {0}")]
    FetchFailure(String),

    #[error("No pairs found for {symbol} on {network}")]
    NoMatch { symbol: String, network: String },

    #[error("Failed to generate analysis: {0}")]
    NarrativeUnavailable(String),

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_message_names_symbol_and_network() {
        let err = AnalyzerError::NoMatch {
            symbol: "PEPE".to_string(),
            network: "base".to_string(),
        };
        assert_eq!(err.to_string(), "No pairs found for PEPE on base");
    }
}
