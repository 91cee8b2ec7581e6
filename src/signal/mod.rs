//! Signal generation module
//!
//! Turns market snapshots into trade intents

mod threshold;
mod types;

pub use threshold::{
    baseline_p_hat, expected_value_yes, implied_prob_from_price, size_by_risk, threshold_decision,
    BaselineEstimator, ProbabilityEstimator, ThresholdParams, ThresholdRule,
};
pub use types::{Side, TradeDecision};
