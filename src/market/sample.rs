//! Deterministic sample data for offline runs

use super::{Market, MarketBatch, MarketSource, Snapshot};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;

/// Sample market identifier
pub const SAMPLE_MARKET_ID: &str = "SAMPLE-2024";

/// Offline source producing a single fixed market and quote
#[derive(Debug, Clone, Default)]
pub struct SampleSource;

impl SampleSource {
    pub fn new() -> Self {
        Self
    }

    /// Build the sample batch
    pub fn batch(&self) -> anyhow::Result<MarketBatch> {
        let now = Utc::now();
        let market = Market {
            id: SAMPLE_MARKET_ID.to_string(),
            question: "Will the sample market close above 0.50?".to_string(),
            close_time: now + Duration::days(1),
            resolution_source: "sample".to_string(),
        };
        let snapshot = Snapshot::new(
            SAMPLE_MARKET_ID,
            now,
            Some(dec!(0.42)),
            Some(dec!(0.46)),
            Some(dec!(0.44)),
            100,
        )?;

        Ok(MarketBatch {
            markets: vec![market],
            snapshots: vec![snapshot],
        })
    }
}

#[async_trait]
impl MarketSource for SampleSource {
    async fn fetch(&self) -> anyhow::Result<MarketBatch> {
        self.batch()
    }

    fn name(&self) -> &'static str {
        "sample"
    }
}
