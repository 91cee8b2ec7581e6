//! Per-trade and portfolio limits

use super::RiskError;
use crate::config::RiskConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Limits enforced by the execution engine
#[derive(Debug, Clone, PartialEq)]
pub struct RiskLimits {
    /// Maximum worst-case loss per trade as a fraction of bankroll
    pub max_risk_pct: Decimal,
    /// Maximum concurrent open positions
    pub max_open_positions: usize,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_risk_pct: dec!(0.01),
            max_open_positions: 5,
        }
    }
}

impl From<&RiskConfig> for RiskLimits {
    fn from(config: &RiskConfig) -> Self {
        Self {
            max_risk_pct: config.risk_per_trade,
            max_open_positions: config.max_open_positions,
        }
    }
}

impl RiskLimits {
    pub fn new(max_risk_pct: Decimal, max_open_positions: usize) -> Self {
        Self {
            max_risk_pct,
            max_open_positions,
        }
    }

    /// Reject non-positive limits
    pub fn validate(&self) -> Result<(), RiskError> {
        if self.max_risk_pct <= Decimal::ZERO {
            return Err(RiskError::NonPositiveRiskPct(self.max_risk_pct));
        }
        if self.max_open_positions == 0 {
            return Err(RiskError::ZeroMaxPositions);
        }
        Ok(())
    }

    /// Largest worst-case loss allowed on one trade
    pub fn risk_cap(&self, bankroll: Decimal) -> Decimal {
        bankroll * self.max_risk_pct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_valid() {
        let limits = RiskLimits::default();
        assert!(limits.validate().is_ok());
        assert_eq!(limits.risk_cap(dec!(100)), dec!(1));
    }

    #[test]
    fn test_invalid_limits() {
        assert_eq!(
            RiskLimits::new(dec!(0), 5).validate(),
            Err(RiskError::NonPositiveRiskPct(dec!(0)))
        );
        assert_eq!(
            RiskLimits::new(dec!(0.01), 0).validate(),
            Err(RiskError::ZeroMaxPositions)
        );
    }
}
