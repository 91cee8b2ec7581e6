//! Persistence integration tests

use chrono::{TimeZone, Utc};
use kakashi::data::SqliteStore;
use kakashi::execution::PaperTrader;
use kakashi::market::SampleSource;
use kakashi::risk::{Resolution, RiskLimits};
use kakashi::signal::{Side, TradeDecision};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_journal_restores_engine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kakashi.db");
    let limits = RiskLimits::new(dec!(0.01), 5);

    let store = SqliteStore::open(&path, dec!(100)).await.unwrap();
    let mut trader = PaperTrader::restore(
        limits.clone(),
        store.get_latest_bankroll().await.unwrap(),
        store.fetch_open_positions().await.unwrap(),
    )
    .unwrap();

    let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let decision = TradeDecision::new("TEST-1", ts, Side::Yes, dec!(0.2), 5, "test").unwrap();
    let position = trader.execute(decision.clone()).unwrap();
    store
        .record_fill(&decision, &position, trader.bankroll(), ts)
        .await
        .unwrap();
    store.close().await;

    let store = SqliteStore::open(&path, dec!(100)).await.unwrap();
    let mut restored = PaperTrader::restore(
        limits,
        store.get_latest_bankroll().await.unwrap(),
        store.fetch_open_positions().await.unwrap(),
    )
    .unwrap();
    assert_eq!(restored.bankroll(), dec!(99));
    assert_eq!(restored.position("TEST-1"), Some(&position));

    let resolution = Resolution::new("TEST-1", 0).unwrap();
    let outcome = restored.settle(&resolution).unwrap();
    assert_eq!(outcome.pnl, dec!(-1.0));
    store
        .record_settlement(&outcome, restored.bankroll(), Utc::now())
        .await
        .unwrap();

    assert_eq!(store.get_latest_bankroll().await.unwrap(), dec!(99));
    assert!(store.fetch_open_positions().await.unwrap().is_empty());
    assert_eq!(store.fetch_outcomes().await.unwrap().len(), 1);

    let trades = store.fetch_trades().await.unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].ts, ts);
    assert_eq!(trades[0].reason, "test");
}

#[tokio::test]
async fn test_sample_batch_persists() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("kakashi.db"), dec!(1000))
        .await
        .unwrap();

    let batch = SampleSource::new().batch().unwrap();
    store.upsert_markets(&batch.markets).await.unwrap();
    store.upsert_markets(&batch.markets).await.unwrap();
    for snapshot in &batch.snapshots {
        store.insert_snapshot(snapshot).await.unwrap();
    }

    // Timestamps are stored at millisecond precision
    let latest = store.fetch_latest_snapshots(5).await.unwrap();
    assert_eq!(latest.len(), 1);
    let expected = &batch.snapshots[0];
    assert_eq!(latest[0].market_id(), expected.market_id());
    assert_eq!(latest[0].bid(), expected.bid());
    assert_eq!(latest[0].ask(), expected.ask());
    assert_eq!(latest[0].last(), expected.last());
    assert_eq!(
        latest[0].ts().timestamp_millis(),
        expected.ts().timestamp_millis()
    );
}
