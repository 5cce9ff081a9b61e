use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

pub const DEFAULT_TARGET_NETWORK: &str = "base";
pub const DEFAULT_DEXSCREENER_BASE_URL: &str = "https://api.dexscreener.com";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    pub api_host: Option<String>,
    pub api_port: Option<u16>,
    pub static_dir: String,

    pub target_network: String,
    pub dexscreener_base_url: String,
    pub http_timeout_secs: u64,

    pub openai_api_key: Option<String>, // Direct provider calls
    pub openai_base_url: String,
    pub analysis_relay_url: Option<String>, // Used when no provider key is set
    pub analysis_relay_token: Option<String>,

    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let config = Self {
            api_host: get("API_HOST"),
            api_port: parse_optional(get("API_PORT"), "API_PORT")?,
            static_dir: get("STATIC_DIR").unwrap_or_else(|| "static".to_string()),

            target_network: get("TARGET_NETWORK")
                .map(|n| n.to_lowercase())
                .unwrap_or_else(|| DEFAULT_TARGET_NETWORK.to_string()),
            dexscreener_base_url: get("DEXSCREENER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_DEXSCREENER_BASE_URL.to_string()),
            http_timeout_secs: parse_optional(get("HTTP_TIMEOUT_SECS"), "HTTP_TIMEOUT_SECS")?
                .unwrap_or(20),

            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            analysis_relay_url: get("ANALYSIS_RELAY_URL"),
            analysis_relay_token: get("ANALYSIS_RELAY_TOKEN"),

            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parse_optional(get("COMPLETION_TEMPERATURE"), "COMPLETION_TEMPERATURE")?
                .unwrap_or(0.7),
            max_tokens: parse_optional(get("COMPLETION_MAX_TOKENS"), "COMPLETION_MAX_TOKENS")?
                .unwrap_or(1000),
        };

        if config.openai_api_key.is_none() && config.analysis_relay_url.is_none() {
            bail!("Either OPENAI_API_KEY or ANALYSIS_RELAY_URL must be set");
        }

        Ok(config)
    }
}

fn parse_optional<T>(value: Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .map(|v| v.parse::<T>().with_context(|| format!("Failed to parse {}", key)))
        .transpose()
}
