//! kakashi: Kalshi market collector and paper trading simulator
//!
//! This library provides the core components for:
//! - Market discovery and orderbook snapshots from the Kalshi REST API
//! - A fixed-threshold decision rule over a pluggable probability estimate
//! - A paper execution engine with per-trade risk caps and settlement
//! - SQLite journaling of markets, snapshots, bankroll and trades
//! - A kill-switch guarded decision loop
//! - Structured logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod data;
pub mod execution;
pub mod market;
pub mod risk;
pub mod runner;
pub mod signal;
pub mod telemetry;
