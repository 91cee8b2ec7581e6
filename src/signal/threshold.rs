//! Fixed-threshold decision rule
//!
//! Buys YES at the last traded price when the estimated edge clears a fixed
//! threshold, sized so the worst-case loss stays within a fraction of the
//! bankroll. The rule never evaluates the NO leg.

use super::{Side, TradeDecision};
use crate::config::RiskConfig;
use crate::market::Snapshot;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Parameters for the threshold rule
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdParams {
    /// Fraction of bankroll risked per trade
    pub risk_pct: Decimal,
    /// Minimum edge required to trade
    pub edge_threshold: Decimal,
    /// No new trades at or above this many open positions
    pub max_positions_open: usize,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            risk_pct: dec!(0.01),
            edge_threshold: dec!(0.03),
            max_positions_open: 5,
        }
    }
}

impl From<&RiskConfig> for ThresholdParams {
    fn from(config: &RiskConfig) -> Self {
        Self {
            risk_pct: config.risk_per_trade,
            edge_threshold: config.edge_threshold,
            max_positions_open: config.max_open_positions,
        }
    }
}

/// Estimates the probability that a market resolves YES
pub trait ProbabilityEstimator: Send + Sync {
    /// Estimate from a snapshot, or `None` if the quote is incomplete
    fn estimate(&self, snapshot: &Snapshot) -> Option<Decimal>;
}

/// Blend of last trade and mid: `0.7 * last + 0.3 * mid`
///
/// Deliberately crude; the mid only stabilises the last print.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineEstimator;

impl ProbabilityEstimator for BaselineEstimator {
    fn estimate(&self, snapshot: &Snapshot) -> Option<Decimal> {
        Some(baseline_p_hat(snapshot.last()?, snapshot.mid()?))
    }
}

/// Blend last trade and mid into a probability estimate
pub fn baseline_p_hat(last: Decimal, mid: Decimal) -> Decimal {
    dec!(0.7) * last + dec!(0.3) * mid
}

/// Binary prices read directly as probabilities (fees ignored)
pub fn implied_prob_from_price(price: Decimal) -> Decimal {
    price
}

/// Expected value per YES contract bought at `price`
pub fn expected_value_yes(price: Decimal, p_hat: Decimal) -> Decimal {
    p_hat - implied_prob_from_price(price)
}

/// Largest whole size whose YES risk fits `bankroll * risk_pct`
pub fn size_by_risk(bankroll: Decimal, risk_pct: Decimal, price: Decimal) -> u64 {
    let max_risk = bankroll * risk_pct;
    if price <= Decimal::ZERO || max_risk <= Decimal::ZERO {
        return 0;
    }
    (max_risk / price).floor().to_u64().unwrap_or(0)
}

/// Threshold rule over a pluggable estimator
pub struct ThresholdRule<E: ProbabilityEstimator> {
    estimator: E,
    params: ThresholdParams,
}

impl<E: ProbabilityEstimator> ThresholdRule<E> {
    pub fn new(estimator: E, params: ThresholdParams) -> Self {
        Self { estimator, params }
    }

    pub fn params(&self) -> &ThresholdParams {
        &self.params
    }

    /// Propose a trade for `snapshot`, if any
    pub fn decide(
        &self,
        snapshot: &Snapshot,
        bankroll: Decimal,
        positions_open: usize,
    ) -> Option<TradeDecision> {
        if positions_open >= self.params.max_positions_open {
            return None;
        }

        let last = snapshot.last()?;
        if snapshot.bid().is_none() || snapshot.ask().is_none() {
            return None;
        }

        let p_hat = self.estimator.estimate(snapshot)?;
        let edge = expected_value_yes(last, p_hat);
        if edge < self.params.edge_threshold {
            return None;
        }

        let size = size_by_risk(bankroll, self.params.risk_pct, last);
        if size == 0 {
            return None;
        }

        let reason = format!(
            "edge={:.3} >= {:.3}; p_hat={:.3}; price={:.2}",
            edge, self.params.edge_threshold, p_hat, last
        );

        match TradeDecision::with_contracts(
            snapshot.market_id(),
            snapshot.ts(),
            Side::Yes,
            last,
            size,
            reason,
        ) {
            Ok(decision) => Some(decision),
            Err(e) => {
                tracing::warn!(
                    market_id = snapshot.market_id(),
                    error = %e,
                    "Discarding invalid decision"
                );
                None
            }
        }
    }
}

impl Default for ThresholdRule<BaselineEstimator> {
    fn default() -> Self {
        Self::new(BaselineEstimator, ThresholdParams::default())
    }
}

/// Apply the threshold rule with the baseline estimator
pub fn threshold_decision(
    snapshot: &Snapshot,
    bankroll: Decimal,
    params: &ThresholdParams,
    positions_open: usize,
) -> Option<TradeDecision> {
    ThresholdRule::new(BaselineEstimator, params.clone()).decide(snapshot, bankroll, positions_open)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(bid: Decimal, ask: Decimal, last: Decimal) -> Snapshot {
        Snapshot::new("M1", Utc::now(), Some(bid), Some(ask), Some(last), 10).unwrap()
    }

    fn params(edge_threshold: Decimal) -> ThresholdParams {
        ThresholdParams {
            edge_threshold,
            ..Default::default()
        }
    }

    #[test]
    fn test_expected_value_yes() {
        assert_eq!(expected_value_yes(dec!(0.44), dec!(0.49)), dec!(0.05));
    }

    #[test]
    fn test_size_by_risk() {
        // $1000 bankroll at 1% => $10 budget, floor(10 / 0.44) = 22
        assert_eq!(size_by_risk(dec!(1000), dec!(0.01), dec!(0.44)), 22);
        assert_eq!(size_by_risk(dec!(1000), dec!(0.01), dec!(0.5)), 20);
    }

    #[test]
    fn test_size_by_risk_degenerate() {
        assert_eq!(size_by_risk(dec!(1000), dec!(0.01), dec!(0)), 0);
        assert_eq!(size_by_risk(dec!(0), dec!(0.01), dec!(0.5)), 0);
        assert_eq!(size_by_risk(dec!(10), dec!(0.01), dec!(0.5)), 0);
    }

    #[test]
    fn test_baseline_p_hat() {
        let s = snapshot(dec!(0.50), dec!(0.60), dec!(0.40));
        assert_eq!(BaselineEstimator.estimate(&s), Some(dec!(0.445)));
    }

    #[test]
    fn test_decision_on_edge() {
        let s = snapshot(dec!(0.50), dec!(0.60), dec!(0.40));
        let d = threshold_decision(&s, dec!(1000), &ThresholdParams::default(), 0).unwrap();

        assert_eq!(d.market_id(), "M1");
        assert_eq!(d.side(), Side::Yes);
        assert_eq!(d.price(), dec!(0.40));
        assert_eq!(d.size(), 25);
        assert_eq!(d.ts(), s.ts());
        assert_eq!(d.reason(), "edge=0.045 >= 0.030; p_hat=0.445; price=0.40");
    }

    #[test]
    fn test_no_decision_below_threshold() {
        // mid == last, so edge is zero
        let s = snapshot(dec!(0.42), dec!(0.46), dec!(0.44));
        let defaults = ThresholdParams::default();
        assert!(threshold_decision(&s, dec!(1000), &defaults, 0).is_none());
    }

    #[test]
    fn test_zero_threshold_trades_at_zero_edge() {
        let s = snapshot(dec!(0.1), dec!(0.12), dec!(0.11));
        let d = threshold_decision(&s, dec!(1000), &params(dec!(0)), 0).unwrap();
        assert_eq!(d.size(), 90);
    }

    #[test]
    fn test_position_gate_first() {
        let s = snapshot(dec!(0.50), dec!(0.60), dec!(0.40));
        let defaults = ThresholdParams::default();
        assert!(threshold_decision(&s, dec!(1000), &defaults, 5).is_none());
        assert!(threshold_decision(&s, dec!(1000), &defaults, 4).is_some());
    }

    #[test]
    fn test_incomplete_snapshot() {
        let p = params(dec!(0));
        let (bid, ask, last) = (Some(dec!(0.5)), Some(dec!(0.6)), Some(dec!(0.4)));

        let no_last = Snapshot::new("M1", Utc::now(), bid, ask, None, 0).unwrap();
        assert!(threshold_decision(&no_last, dec!(1000), &p, 0).is_none());

        let no_bid = Snapshot::new("M1", Utc::now(), None, ask, last, 0).unwrap();
        assert!(threshold_decision(&no_bid, dec!(1000), &p, 0).is_none());
    }

    #[test]
    fn test_size_beyond_i64_not_clamped() {
        let s = snapshot(dec!(0.50), dec!(0.60), dec!(0.40));
        let bankroll = dec!(500000000000000000000);
        let d = threshold_decision(&s, bankroll, &ThresholdParams::default(), 0).unwrap();
        assert_eq!(d.size(), 12_500_000_000_000_000_000);
    }

    #[test]
    fn test_too_small_to_size() {
        let s = snapshot(dec!(0.50), dec!(0.60), dec!(0.40));
        let defaults = ThresholdParams::default();
        assert!(threshold_decision(&s, dec!(30), &defaults, 0).is_none());
    }

    #[test]
    fn test_custom_estimator() {
        struct Fixed(Decimal);
        impl ProbabilityEstimator for Fixed {
            fn estimate(&self, _: &Snapshot) -> Option<Decimal> {
                Some(self.0)
            }
        }

        let rule = ThresholdRule::new(Fixed(dec!(0.9)), ThresholdParams::default());
        let s = snapshot(dec!(0.42), dec!(0.46), dec!(0.44));
        let d = rule.decide(&s, dec!(1000), 0).unwrap();
        assert_eq!(d.size(), 22);
    }
}
