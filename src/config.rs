//! Configuration types for kakashi

use crate::telemetry::LogFormat;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Sizing and risk configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    /// Fraction of bankroll risked per trade
    #[serde(default = "default_risk_per_trade")]
    pub risk_per_trade: Decimal,

    /// Maximum concurrent open positions
    #[serde(default = "default_max_open_positions")]
    pub max_open_positions: usize,

    /// Minimum edge to open a trade
    #[serde(default = "default_edge_threshold")]
    pub edge_threshold: Decimal,

    /// Bankroll seeded into an empty store
    #[serde(default = "default_initial_bankroll")]
    pub initial_bankroll: Decimal,
}

fn default_risk_per_trade() -> Decimal {
    dec!(0.01)
}
fn default_max_open_positions() -> usize {
    5
}
fn default_edge_threshold() -> Decimal {
    dec!(0.03)
}
fn default_initial_bankroll() -> Decimal {
    dec!(1000.0)
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_per_trade: default_risk_per_trade(),
            max_open_positions: default_max_open_positions(),
            edge_threshold: default_edge_threshold(),
            initial_bankroll: default_initial_bankroll(),
        }
    }
}

/// Market data API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Overrides `KALSHI_BASE_URL` and the built-in default
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per request
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Markets per page
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    /// Use the live API instead of sample data
    #[serde(default)]
    pub live: bool,
}

fn default_timeout_secs() -> u64 {
    10
}
fn default_retries() -> u32 {
    3
}
fn default_page_limit() -> u32 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            page_limit: default_page_limit(),
            live: false,
        }
    }
}

/// Persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/kakashi.db")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Decision loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    /// Seconds between cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Sentinel file; while it exists cycles are skipped
    #[serde(default = "default_kill_switch_path")]
    pub kill_switch_path: PathBuf,

    /// Stop after this many cycles
    #[serde(default)]
    pub max_cycles: Option<u64>,
}

fn default_interval_secs() -> u64 {
    60
}
fn default_kill_switch_path() -> PathBuf {
    PathBuf::from("data/KILL")
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            kill_switch_path: default_kill_switch_path(),
            max_cycles: None,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus exporter port; disabled when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path`, or use defaults when the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }
}
