//! Decision loop
//!
//! One cycle: kill-switch check, fetch, persist markets and snapshots,
//! decide, execute, journal the result. Cycles run sequentially on a single
//! task and never interleave.

mod kill_switch;

pub use kill_switch::KillSwitch;

use crate::config::Config;
use crate::data::SqliteStore;
use crate::execution::PaperTrader;
use crate::market::MarketSource;
use crate::risk::{Outcome, Resolution, RiskLimits};
use crate::signal::{BaselineEstimator, ThresholdParams, ThresholdRule};
use crate::telemetry::{self, CounterMetric};
use chrono::Utc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Counts from a completed cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub markets: usize,
    pub snapshots: usize,
    pub decisions: usize,
    pub fills: usize,
}

/// Result of one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleReport {
    /// Kill switch engaged; nothing was fetched or traded
    Skipped,
    Completed(CycleStats),
}

/// Owns the engine, the store and the market source for a trading session
pub struct Runner {
    store: SqliteStore,
    trader: PaperTrader,
    rule: ThresholdRule<BaselineEstimator>,
    source: Box<dyn MarketSource>,
    kill_switch: KillSwitch,
}

impl Runner {
    /// Open the configured store and restore engine state from it
    pub async fn bootstrap(config: &Config, source: Box<dyn MarketSource>) -> anyhow::Result<Self> {
        let store = SqliteStore::open(&config.store.db_path, config.risk.initial_bankroll).await?;
        Self::with_store(config, store, source).await
    }

    /// Restore engine state from an already open store
    pub async fn with_store(
        config: &Config,
        store: SqliteStore,
        source: Box<dyn MarketSource>,
    ) -> anyhow::Result<Self> {
        let bankroll = store.get_latest_bankroll().await?;
        let positions = store.fetch_open_positions().await?;
        let trader = PaperTrader::restore(RiskLimits::from(&config.risk), bankroll, positions)?;

        tracing::info!(
            bankroll = %trader.bankroll(),
            open_positions = trader.open_position_count(),
            source = source.name(),
            "Runner ready"
        );

        Ok(Self {
            store,
            trader,
            rule: ThresholdRule::new(BaselineEstimator, ThresholdParams::from(&config.risk)),
            source,
            kill_switch: KillSwitch::new(&config.runner.kill_switch_path),
        })
    }

    pub fn trader(&self) -> &PaperTrader {
        &self.trader
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn kill_switch(&self) -> &KillSwitch {
        &self.kill_switch
    }

    /// Run a single decision cycle
    pub async fn run_cycle(&mut self) -> anyhow::Result<CycleReport> {
        if self.kill_switch.is_engaged() {
            tracing::warn!(
                path = %self.kill_switch.path().display(),
                "Kill switch engaged, skipping cycle"
            );
            telemetry::increment_counter(CounterMetric::CyclesSkipped);
            return Ok(CycleReport::Skipped);
        }

        let batch = self.source.fetch().await?;
        self.store.upsert_markets(&batch.markets).await?;

        let mut stats = CycleStats {
            markets: batch.markets.len(),
            ..CycleStats::default()
        };

        for snapshot in &batch.snapshots {
            self.store.insert_snapshot(snapshot).await?;
            stats.snapshots += 1;
            telemetry::increment_counter(CounterMetric::SnapshotsStored);

            let Some(decision) = self.rule.decide(
                snapshot,
                self.trader.bankroll(),
                self.trader.open_position_count(),
            ) else {
                continue;
            };
            stats.decisions += 1;

            tracing::debug!(
                market_id = decision.market_id(),
                reason = decision.reason(),
                "Trade proposed"
            );

            if let Some(position) = self.trader.execute(decision.clone()) {
                self.store
                    .record_fill(&decision, &position, self.trader.bankroll(), Utc::now())
                    .await?;
                stats.fills += 1;
            }
        }

        telemetry::increment_counter(CounterMetric::CyclesRun);
        tracing::info!(
            markets = stats.markets,
            snapshots = stats.snapshots,
            decisions = stats.decisions,
            fills = stats.fills,
            bankroll = %self.trader.bankroll(),
            "Cycle complete"
        );

        Ok(CycleReport::Completed(stats))
    }

    /// Settle an open position and journal the outcome
    pub async fn settle(&mut self, resolution: &Resolution) -> anyhow::Result<Outcome> {
        let outcome = self.trader.settle(resolution)?;
        self.store
            .record_settlement(&outcome, self.trader.bankroll(), Utc::now())
            .await?;
        Ok(outcome)
    }

    /// Run cycles every `interval` until Ctrl-C or `max_cycles`
    ///
    /// Returns the number of cycles attempted, including skipped ones.
    pub async fn run(
        &mut self,
        interval: Duration,
        max_cycles: Option<u64>,
    ) -> anyhow::Result<u64> {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        let mut cycles = 0u64;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {}
            }

            self.run_cycle().await?;
            cycles += 1;

            if max_cycles.is_some_and(|max| cycles >= max) {
                tracing::info!(cycles, "Reached cycle limit");
                break;
            }
        }

        Ok(cycles)
    }

    /// Close the store
    pub async fn shutdown(self) {
        self.store.close().await;
    }
}
