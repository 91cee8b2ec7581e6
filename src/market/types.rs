//! Market and snapshot types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Malformed market data or trade input, rejected at construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A probability-like field fell outside [0, 1]
    #[error("{field} must be within [0, 1], got {value}")]
    PriceOutOfRange { field: &'static str, value: Decimal },
    /// Ask quoted below bid
    #[error("ask {ask} must be >= bid {bid}")]
    CrossedQuote { bid: Decimal, ask: Decimal },
    /// Negative traded volume
    #[error("volume must be non-negative, got {0}")]
    NegativeVolume(i64),
    /// Size of zero or less
    #[error("size must be positive, got {0}")]
    NonPositiveSize(i64),
    /// Side outside {YES, NO}
    #[error("unsupported side: {0}")]
    UnsupportedSide(String),
    /// Resolution outside {0, 1}
    #[error("resolved value must be 0 or 1, got {0}")]
    InvalidResolution(i64),
    /// Empty market identifier
    #[error("market id must not be empty")]
    EmptyMarketId,
}

/// Check that a probability-like value lies in [0, 1]
pub(crate) fn check_probability(
    field: &'static str,
    value: Decimal,
) -> Result<Decimal, ValidationError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(ValidationError::PriceOutOfRange { field, value });
    }
    Ok(value)
}

/// A binary market listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Market ticker
    pub id: String,
    /// Question the market resolves
    pub question: String,
    /// Close time
    pub close_time: DateTime<Utc>,
    /// Where the resolution comes from
    pub resolution_source: String,
}

/// Point-in-time quote for one market
///
/// Only constructible through [`Snapshot::new`], so every instance satisfies
/// the range and `ask >= bid` invariants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    market_id: String,
    ts: DateTime<Utc>,
    bid: Option<Decimal>,
    ask: Option<Decimal>,
    last: Option<Decimal>,
    volume: u64,
}

impl Snapshot {
    /// Validate and build a snapshot
    pub fn new(
        market_id: impl Into<String>,
        ts: DateTime<Utc>,
        bid: Option<Decimal>,
        ask: Option<Decimal>,
        last: Option<Decimal>,
        volume: i64,
    ) -> Result<Self, ValidationError> {
        let market_id = market_id.into();
        if market_id.is_empty() {
            return Err(ValidationError::EmptyMarketId);
        }

        let bid = bid.map(|v| check_probability("bid", v)).transpose()?;
        let ask = ask.map(|v| check_probability("ask", v)).transpose()?;
        let last = last.map(|v| check_probability("last", v)).transpose()?;

        if let (Some(bid), Some(ask)) = (bid, ask) {
            if ask < bid {
                return Err(ValidationError::CrossedQuote { bid, ask });
            }
        }

        let volume = u64::try_from(volume).map_err(|_| ValidationError::NegativeVolume(volume))?;

        Ok(Self {
            market_id,
            ts,
            bid,
            ask,
            last,
            volume,
        })
    }

    pub fn market_id(&self) -> &str {
        &self.market_id
    }

    pub fn ts(&self) -> DateTime<Utc> {
        self.ts
    }

    pub fn bid(&self) -> Option<Decimal> {
        self.bid
    }

    pub fn ask(&self) -> Option<Decimal> {
        self.ask
    }

    pub fn last(&self) -> Option<Decimal> {
        self.last
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }

    /// Midpoint of bid and ask, when both are quoted
    pub fn mid(&self) -> Option<Decimal> {
        Some((self.bid? + self.ask?) / Decimal::TWO)
    }
}
