//! Signal types

use crate::market::{check_probability, ValidationError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Contract side of a binary market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Pays 1 if the market resolves yes
    Yes,
    /// Pays 1 if the market resolves no
    No,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Yes => "YES",
            Side::No => "NO",
        }
    }

    /// Worst-case loss of `size` contracts bought at `price`
    pub fn risk(&self, price: Decimal, size: u64) -> Decimal {
        let size = Decimal::from(size);
        match self {
            Side::Yes => price * size,
            Side::No => (Decimal::ONE - price) * size,
        }
    }

    /// Payout per contract given a 0/1 resolution
    pub fn payout_per_contract(&self, resolved_value: u8) -> Decimal {
        let resolved = Decimal::from(resolved_value);
        match self {
            Side::Yes => resolved,
            Side::No => Decimal::ONE - resolved,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Side {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "YES" => Ok(Side::Yes),
            "NO" => Ok(Side::No),
            _ => Err(ValidationError::UnsupportedSide(s.to_string())),
        }
    }
}

/// A trade intent produced by the decision rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeDecision {
    market_id: String,
    ts: DateTime<Utc>,
    side: Side,
    price: Decimal,
    size: u64,
    reason: String,
}

impl TradeDecision {
    /// Validate and build a decision from an untrusted signed size
    pub fn new(
        market_id: impl Into<String>,
        ts: DateTime<Utc>,
        side: Side,
        price: Decimal,
        size: i64,
        reason: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let contracts = u64::try_from(size).map_err(|_| ValidationError::NonPositiveSize(size))?;
        Self::with_contracts(market_id, ts, side, price, contracts, reason)
    }

    /// Validate and build a decision for a whole number of contracts
    pub fn with_contracts(
        market_id: impl Into<String>,
        ts: DateTime<Utc>,
        side: Side,
        price: Decimal,
        contracts: u64,
        reason: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let market_id = market_id.into();
        if market_id.is_empty() {
            return Err(ValidationError::EmptyMarketId);
        }
        let price = check_probability("price", price)?;
        if contracts == 0 {
            return Err(ValidationError::NonPositiveSize(0));
        }

        Ok(Self {
            market_id,
            ts,
            side,
            price,
            size: contracts,
            reason: reason.into(),
        })
    }

    pub fn market_id(&self) -> &str {
        &self.market_id
    }

    pub fn ts(&self) -> DateTime<Utc> {
        self.ts
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Worst-case loss if filled
    pub fn risk(&self) -> Decimal {
        self.side.risk(self.price, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_side_parse() {
        assert_eq!("YES".parse::<Side>().unwrap(), Side::Yes);
        assert_eq!("no".parse::<Side>().unwrap(), Side::No);
        assert_eq!(
            "MAYBE".parse::<Side>().unwrap_err(),
            ValidationError::UnsupportedSide("MAYBE".to_string())
        );
    }

    #[test]
    fn test_side_serde() {
        assert_eq!(serde_json::to_string(&Side::Yes).unwrap(), "\"YES\"");
        assert!(serde_json::from_str::<Side>("\"SIDEWAYS\"").is_err());
    }

    #[test]
    fn test_side_risk() {
        assert_eq!(Side::Yes.risk(dec!(0.2), 5), dec!(1.0));
        assert_eq!(Side::No.risk(dec!(0.2), 5), dec!(4.0));
    }

    #[test]
    fn test_payout_per_contract() {
        assert_eq!(Side::Yes.payout_per_contract(1), dec!(1));
        assert_eq!(Side::Yes.payout_per_contract(0), dec!(0));
        assert_eq!(Side::No.payout_per_contract(0), dec!(1));
        assert_eq!(Side::No.payout_per_contract(1), dec!(0));
    }

    #[test]
    fn test_decision_validation() {
        let ok = TradeDecision::new("M1", Utc::now(), Side::Yes, dec!(0.5), 3, "test");
        assert_eq!(ok.unwrap().risk(), dec!(1.5));

        let zero = TradeDecision::new("M1", Utc::now(), Side::Yes, dec!(0.5), 0, "test");
        assert_eq!(zero.unwrap_err(), ValidationError::NonPositiveSize(0));

        let negative = TradeDecision::new("M1", Utc::now(), Side::Yes, dec!(0.5), -2, "test");
        assert_eq!(negative.unwrap_err(), ValidationError::NonPositiveSize(-2));

        let price = TradeDecision::new("M1", Utc::now(), Side::No, dec!(1.2), 1, "test");
        assert!(matches!(
            price.unwrap_err(),
            ValidationError::PriceOutOfRange { field: "price", .. }
        ));
    }

    #[test]
    fn test_decision_with_contracts_keeps_full_size() {
        let size = u64::MAX;
        let decision =
            TradeDecision::with_contracts("M1", Utc::now(), Side::Yes, dec!(0.5), size, "big")
                .unwrap();
        assert_eq!(decision.size(), size);

        let zero = TradeDecision::with_contracts("M1", Utc::now(), Side::Yes, dec!(0.5), 0, "zero");
        assert_eq!(zero.unwrap_err(), ValidationError::NonPositiveSize(0));
    }
}
