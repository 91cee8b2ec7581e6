//! Market data integration tests

use kakashi::market::{KalshiClient, KalshiConfig, MarketSource, SampleSource, SAMPLE_MARKET_ID};
use rust_decimal_macros::dec;
use std::time::Duration;

#[tokio::test]
async fn test_sample_source_batch() {
    let batch = SampleSource::new().fetch().await.unwrap();
    assert_eq!(batch.markets.len(), 1);
    assert_eq!(batch.snapshots.len(), 1);

    let snapshot = &batch.snapshots[0];
    assert_eq!(snapshot.market_id(), SAMPLE_MARKET_ID);
    assert_eq!(snapshot.bid(), Some(dec!(0.42)));
    assert_eq!(snapshot.ask(), Some(dec!(0.46)));
    assert_eq!(snapshot.last(), Some(dec!(0.44)));
    assert_eq!(snapshot.volume(), 100);
}

#[tokio::test]
async fn test_unreachable_api_fails_after_retries() {
    let client = KalshiClient::with_config(KalshiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_millis(200),
        retries: 2,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(2),
        page_limit: 1,
    })
    .unwrap();

    assert!(client.fetch().await.is_err());
}
