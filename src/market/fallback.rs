//! Primary source with an offline fallback

use super::{MarketBatch, MarketSource};
use async_trait::async_trait;

/// Fetches from `primary`, switching to `fallback` when it fails
pub struct FallbackSource<P, F> {
    primary: P,
    fallback: F,
}

impl<P: MarketSource, F: MarketSource> FallbackSource<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P: MarketSource, F: MarketSource> MarketSource for FallbackSource<P, F> {
    async fn fetch(&self) -> anyhow::Result<MarketBatch> {
        match self.primary.fetch().await {
            Ok(batch) => Ok(batch),
            Err(e) => {
                tracing::warn!(
                    source = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %e,
                    "Market fetch failed, using fallback data"
                );
                self.fallback.fetch().await
            }
        }
    }

    fn name(&self) -> &'static str {
        self.primary.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{SampleSource, SAMPLE_MARKET_ID};

    struct FailingSource;

    #[async_trait]
    impl MarketSource for FailingSource {
        async fn fetch(&self) -> anyhow::Result<MarketBatch> {
            anyhow::bail!("listing unavailable")
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_falls_back_on_error() {
        let source = FallbackSource::new(FailingSource, SampleSource::new());
        let batch = source.fetch().await.unwrap();
        assert_eq!(batch.markets.len(), 1);
        assert_eq!(batch.markets[0].id, SAMPLE_MARKET_ID);
        assert_eq!(source.name(), "failing");
    }

    #[tokio::test]
    async fn test_primary_used_when_healthy() {
        let source = FallbackSource::new(SampleSource::new(), FailingSource);
        let batch = source.fetch().await.unwrap();
        assert_eq!(batch.snapshots.len(), 1);
    }
}
