//! Risk management types

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Invalid risk limits or starting state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiskError {
    /// Starting bankroll must be positive
    #[error("starting bankroll must be positive, got {0}")]
    NonPositiveBankroll(Decimal),
    /// Restored bankroll must not be negative
    #[error("bankroll must not be negative, got {0}")]
    NegativeBankroll(Decimal),
    /// Per-trade risk fraction must be positive
    #[error("max risk pct must be positive, got {0}")]
    NonPositiveRiskPct(Decimal),
    /// At least one position must be allowed
    #[error("max open positions must be positive")]
    ZeroMaxPositions,
    /// Journal holds two positions for one market
    #[error("duplicate open position for market {0}")]
    DuplicatePosition(String),
}

/// Why a trade was not executed
///
/// Policy outcomes, not errors: they are recorded in the decision log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rejection {
    /// The market already has an open position
    PositionAlreadyOpen,
    /// Open-position cap reached
    MaxOpenPositions,
    /// Worst-case loss above the per-trade cap
    RiskCapExceeded,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::PositionAlreadyOpen => "position already open",
            Rejection::MaxOpenPositions => "max open positions reached",
            Rejection::RiskCapExceeded => "risk per trade cap",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
