//! Clients for the external collaborators: pair data and text completion.

pub mod completion;
pub mod dexscreener;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::AnalyzerError;
use crate::models::PairRecord;

pub use completion::{CompletionSettings, OpenAiCompleter, RelayCompleter};
pub use dexscreener::DexScreenerClient;

/// Source of trading pairs for a search query.
#[async_trait]
pub trait PairSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<PairRecord>, AnalyzerError>;
}

/// Free-text completion from a language model.
#[async_trait]
pub trait TextCompleter: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AnalyzerError>;
}

/// Picks the direct provider when a key is configured, otherwise the relay.
pub fn completer_from_config(config: &Config) -> Result<Arc<dyn TextCompleter>, AnalyzerError> {
    let timeout = Duration::from_secs(config.http_timeout_secs);

    if let Some(api_key) = &config.openai_api_key {
        let settings = CompletionSettings {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };
        let completer = OpenAiCompleter::new(api_key, &config.openai_base_url, settings, timeout)?;
        return Ok(Arc::new(completer));
    }

    match &config.analysis_relay_url {
        Some(url) => Ok(Arc::new(RelayCompleter::new(
            url,
            config.analysis_relay_token.clone(),
            timeout,
        )?)),
        None => Err(AnalyzerError::ConfigError(
            "no completion backend configured".to_string(),
        )),
    }
}
