//! Prometheus metrics

use crate::risk::Rejection;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Cash bankroll
    Bankroll,
    /// Open position count
    OpenPositions,
    /// Realized P&L this run
    RealizedPnl,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Paper fills
    Fills,
    /// Snapshots persisted
    SnapshotsStored,
    /// Decision cycles completed
    CyclesRun,
    /// Cycles skipped by the kill switch
    CyclesSkipped,
}

impl GaugeMetric {
    fn name(self) -> &'static str {
        match self {
            GaugeMetric::Bankroll => "kakashi_bankroll_usd",
            GaugeMetric::OpenPositions => "kakashi_open_positions",
            GaugeMetric::RealizedPnl => "kakashi_realized_pnl_usd",
        }
    }
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::Fills => "kakashi_fills_total",
            CounterMetric::SnapshotsStored => "kakashi_snapshots_stored_total",
            CounterMetric::CyclesRun => "kakashi_cycles_total",
            CounterMetric::CyclesSkipped => "kakashi_cycles_skipped_total",
        }
    }
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    ::metrics::gauge!(metric.name()).set(value);
}

/// Increment a counter by one
pub fn increment_counter(metric: CounterMetric) {
    ::metrics::counter!(metric.name()).increment(1);
}

/// Count a policy rejection, labelled by reason
pub fn record_rejection(reason: Rejection) {
    ::metrics::counter!("kakashi_rejections_total", "reason" => reason.as_str()).increment(1);
}

/// Serve metrics over HTTP on `port`; must run inside a tokio runtime
pub fn install_prometheus(port: u16) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()?;
    tracing::info!(port, "Prometheus exporter listening");
    Ok(())
}
