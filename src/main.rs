use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod analysis;
mod api;
mod config;
mod error;
mod export;
mod models;
mod web;

use crate::analysis::TokenAnalyzer;
use crate::api::DexScreenerClient;
use crate::config::Config;
use crate::web::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(Config::load()?);
    info!("Configuration loaded, target network: {}", config.target_network);

    let timeout = Duration::from_secs(config.http_timeout_secs);
    let dexscreener = DexScreenerClient::new(&config.dexscreener_base_url, timeout)
        .context("Failed to create DexScreener client")?;
    info!("DexScreener client initialized for {}", config.dexscreener_base_url);

    let completer = api::completer_from_config(&config).context("Failed to create completion client")?;
    if config.openai_api_key.is_some() {
        info!("Using direct completion provider with model {}", config.model);
    } else {
        info!("Using analysis relay for completions");
    }

    let analyzer = Arc::new(TokenAnalyzer::new(
        Arc::new(dexscreener),
        completer,
        &config.target_network,
    ));

    let state = AppState::new(analyzer, config.clone());
    web::server::start_server(state, config).await
}
