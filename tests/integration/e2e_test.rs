//! End-to-end integration tests

use chrono::Utc;
use kakashi::config::Config;
use kakashi::execution::{ExecutionError, PaperTrader};
use kakashi::market::SampleSource;
use kakashi::risk::{Resolution, RiskLimits};
use kakashi::runner::{CycleReport, Runner};
use kakashi::signal::{Side, TradeDecision};
use rust_decimal_macros::dec;

fn decision(market_id: &str, price: rust_decimal::Decimal, size: i64) -> TradeDecision {
    TradeDecision::new(market_id, Utc::now(), Side::Yes, price, size, "test").unwrap()
}

#[test]
fn test_config_example_parses() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.risk.risk_per_trade, dec!(0.01));
    assert_eq!(config.risk.max_open_positions, 5);
    assert_eq!(config.store.db_path.to_str(), Some("data/kakashi.db"));
    assert!(config.telemetry.metrics_port.is_none());
}

#[test]
fn test_bankroll_100_risk_cap() {
    let mut trader = PaperTrader::new(RiskLimits::new(dec!(0.01), 5), dec!(100)).unwrap();

    assert!(trader.execute(decision("TEST-1", dec!(0.5), 3)).is_none());
    assert_eq!(trader.bankroll(), dec!(100));

    let position = trader.execute(decision("TEST-1", dec!(0.2), 5)).unwrap();
    assert_eq!(position.size, 5);
    assert_eq!(trader.bankroll(), dec!(99.0));
    assert_eq!(trader.open_position_count(), 1);
}

#[test]
fn test_bankroll_50_settle_cycle() {
    let mut trader = PaperTrader::new(RiskLimits::new(dec!(0.02), 5), dec!(50)).unwrap();

    trader.execute(decision("TEST-2", dec!(0.2), 5)).unwrap();
    assert_eq!(trader.bankroll(), dec!(49.0));

    let resolution = Resolution::new("TEST-2", 1).unwrap();
    let outcome = trader.settle(&resolution).unwrap();
    assert_eq!(outcome.pnl, dec!(4.0));
    assert_eq!(trader.bankroll(), dec!(54.0));
    assert_eq!(trader.open_position_count(), 0);

    let second = trader.settle(&resolution);
    assert!(matches!(second, Err(ExecutionError::NoOpenPosition(_))));
    assert_eq!(trader.bankroll(), dec!(54.0));
}

#[tokio::test]
async fn test_sample_run_journals_snapshot_without_trading() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.store.db_path = dir.path().join("kakashi.db");
    config.runner.kill_switch_path = dir.path().join("KILL");

    let mut runner = Runner::bootstrap(&config, Box::new(SampleSource::new()))
        .await
        .unwrap();

    // Sample quote has negative edge: p_hat 0.44 against price 0.44
    match runner.run_cycle().await.unwrap() {
        CycleReport::Completed(stats) => {
            assert_eq!(stats.snapshots, 1);
            assert_eq!(stats.fills, 0);
        }
        CycleReport::Skipped => panic!("cycle unexpectedly skipped"),
    }
    assert_eq!(runner.trader().bankroll(), dec!(1000));

    std::fs::write(&config.runner.kill_switch_path, b"").unwrap();
    assert_eq!(runner.run_cycle().await.unwrap(), CycleReport::Skipped);
    let snapshots = runner.store().fetch_latest_snapshots(10).await.unwrap();
    assert_eq!(snapshots.len(), 1);
}
