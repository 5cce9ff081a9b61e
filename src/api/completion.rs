//! Text completion clients
//!
//! Two ways to reach the model: straight to the OpenAI chat completions API, or
//! through a relay function that holds the provider key and answers
//! `{ "analysis": "..." }`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use super::TextCompleter;
use crate::error::AnalyzerError;

/// Generation parameters fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: crate::config::DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

fn build_http_client(timeout: Duration, name: &str) -> Result<Client, AnalyzerError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AnalyzerError::ConfigError(format!("HTTP client for {}: {}", name, e)))
}

/// Rejects blank model output.
fn usable_text(text: Option<String>) -> Result<String, AnalyzerError> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(AnalyzerError::NarrativeUnavailable(
            "completion returned no text".to_string(),
        )),
    }
}

// ============================================================================
// OpenAI chat completions
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAiCompleter {
    api_key: String,
    base_url: String,
    settings: CompletionSettings,
    client: Client,
}

impl OpenAiCompleter {
    pub fn new(
        api_key: &str,
        base_url: &str,
        settings: CompletionSettings,
        timeout: Duration,
    ) -> Result<Self, AnalyzerError> {
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            settings,
            client: build_http_client(timeout, "OpenAI")?,
        })
    }
}

#[async_trait]
impl TextCompleter for OpenAiCompleter {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AnalyzerError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_prompt },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        info!("Sending completion request to {} with model {}", url, self.settings.model);
        debug!("Prompt: {}", user_prompt);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyzerError::NarrativeUnavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderErrorBody>(&error_text)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or(error_text);
            error!("Completion API error: {} - {}", status, message);
            return Err(AnalyzerError::NarrativeUnavailable(format!("HTTP {}: {}", status, message)));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError::NarrativeUnavailable(format!("invalid response body: {}", e)))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content);
        usable_text(text)
    }
}

// ============================================================================
// Relay function
// ============================================================================

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    prompt: &'a str,
}

/// Text the relay substitutes for an empty model reply, with HTTP 200.
const RELAY_EMPTY_REPLY: &str = "Failed to generate analysis";

#[derive(Debug, Deserialize)]
struct RelayResponse {
    analysis: Option<String>,
    error: Option<String>,
}

/// Forwards the prompt to a relay that owns the provider credentials.
/// The relay applies its own system prompt, so ours is prepended to the user text.
#[derive(Debug, Clone)]
pub struct RelayCompleter {
    url: String,
    token: Option<String>,
    client: Client,
}

impl RelayCompleter {
    pub fn new(url: &str, token: Option<String>, timeout: Duration) -> Result<Self, AnalyzerError> {
        Ok(Self {
            url: url.to_string(),
            token,
            client: build_http_client(timeout, "analysis relay")?,
        })
    }
}

#[async_trait]
impl TextCompleter for RelayCompleter {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AnalyzerError> {
        let prompt = format!("{}\n\n{}", system_prompt, user_prompt);
        info!("Sending analysis request to relay {}", self.url);

        let mut request = self.client.post(&self.url).json(&RelayRequest { prompt: &prompt });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AnalyzerError::NarrativeUnavailable(format!("relay request failed: {}", e)))?;

        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<RelayResponse>(&error_text).ok();

        if !status.is_success() {
            let message = body.and_then(|b| b.error).unwrap_or(error_text);
            error!("Analysis relay error: {} - {}", status, message);
            return Err(AnalyzerError::NarrativeUnavailable(format!("HTTP {}: {}", status, message)));
        }

        match body {
            Some(RelayResponse { error: Some(message), .. }) => {
                Err(AnalyzerError::NarrativeUnavailable(message))
            }
            Some(RelayResponse { analysis: Some(text), .. }) if text.trim() == RELAY_EMPTY_REPLY => {
                error!("Analysis relay reported an empty model reply");
                Err(AnalyzerError::NarrativeUnavailable(
                    "relay returned no model text".to_string(),
                ))
            }
            Some(RelayResponse { analysis, .. }) => usable_text(analysis),
            None => Err(AnalyzerError::NarrativeUnavailable(
                "relay returned an unreadable body".to_string(),
            )),
        }
    }
}
