//! Position and outcome model

use crate::market::ValidationError;
use crate::signal::Side;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// An open position, one per market
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    /// Market identifier
    pub market_id: String,
    /// Contract side held
    pub side: Side,
    /// Entry price
    pub entry_price: Decimal,
    /// Contracts held
    pub size: u64,
    /// When the position was opened
    pub opened_at: DateTime<Utc>,
}

impl Position {
    /// Worst-case loss
    pub fn risk(&self) -> Decimal {
        self.side.risk(self.entry_price, self.size)
    }

    /// Total payout for a 0/1 resolution
    pub fn payout(&self, resolved_value: u8) -> Decimal {
        self.side.payout_per_contract(resolved_value) * Decimal::from(self.size)
    }
}

/// Final binary resolution of a market
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    market_id: String,
    resolved_value: u8,
}

impl Resolution {
    /// Validate that the resolution is 0 or 1
    pub fn new(market_id: impl Into<String>, resolved_value: i64) -> Result<Self, ValidationError> {
        let market_id = market_id.into();
        if market_id.is_empty() {
            return Err(ValidationError::EmptyMarketId);
        }
        match resolved_value {
            0 | 1 => Ok(Self {
                market_id,
                resolved_value: resolved_value as u8,
            }),
            other => Err(ValidationError::InvalidResolution(other)),
        }
    }

    pub fn market_id(&self) -> &str {
        &self.market_id
    }

    pub fn resolved_value(&self) -> u8 {
        self.resolved_value
    }
}

/// Realized result of settling a position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// Market identifier
    pub market_id: String,
    /// 0 or 1
    pub resolved_value: u8,
    /// Payout minus the risk paid at entry
    pub pnl: Decimal,
}
