//! Market data module
//!
//! Market listings and snapshots, sourced from the Kalshi REST API or from
//! deterministic sample data for offline runs

mod fallback;
mod kalshi;
mod sample;
mod types;

pub use fallback::FallbackSource;
pub use kalshi::{KalshiClient, KalshiConfig, KalshiError, KALSHI_API_URL};
pub use sample::{SampleSource, SAMPLE_MARKET_ID};
pub use types::{Market, Snapshot, ValidationError};

pub(crate) use types::check_probability;

use crate::config::ApiConfig;
use async_trait::async_trait;

/// Markets and their snapshots from one collection pass
#[derive(Debug, Clone, Default)]
pub struct MarketBatch {
    pub markets: Vec<Market>,
    pub snapshots: Vec<Snapshot>,
}

/// Trait for market data sources
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Fetch the current markets and a snapshot for each quotable one
    async fn fetch(&self) -> anyhow::Result<MarketBatch>;
    /// Short name for logging
    fn name(&self) -> &'static str;
}

/// Build the configured market source
///
/// Live mode queries Kalshi and falls back to sample data when listing fails.
pub fn source_from_config(api: &ApiConfig, live: bool) -> anyhow::Result<Box<dyn MarketSource>> {
    if !live {
        return Ok(Box::new(SampleSource::new()));
    }
    let client = KalshiClient::with_config(KalshiConfig::from(api))?;
    tracing::info!(base_url = %client.config().base_url, "Using live Kalshi market data");
    Ok(Box::new(FallbackSource::new(client, SampleSource::new())))
}
