//! Paper trading execution engine
//!
//! Fills accepted decisions immediately at the decision price, debiting the
//! worst-case loss from the bankroll, and credits the payout on settlement.

use super::{DecisionRecord, ExecutionError, ExecutionStatus};
use crate::risk::{Outcome, Position, Rejection, Resolution, RiskError, RiskLimits};
use crate::signal::TradeDecision;
use crate::telemetry::{self, CounterMetric, GaugeMetric};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Paper trading engine with risk-capped sizing
///
/// Owns the bankroll, the open-position map, the decision log and the
/// outcome history. All mutation goes through `&mut self`.
#[derive(Debug, Clone)]
pub struct PaperTrader {
    limits: RiskLimits,
    bankroll: Decimal,
    positions: BTreeMap<String, Position>,
    decision_log: Vec<DecisionRecord>,
    outcomes: Vec<Outcome>,
}

impl PaperTrader {
    /// Create an engine with a fresh bankroll
    pub fn new(limits: RiskLimits, starting_bankroll: Decimal) -> Result<Self, RiskError> {
        if starting_bankroll <= Decimal::ZERO {
            return Err(RiskError::NonPositiveBankroll(starting_bankroll));
        }
        limits.validate()?;

        Ok(Self {
            limits,
            bankroll: starting_bankroll,
            positions: BTreeMap::new(),
            decision_log: vec![],
            outcomes: vec![],
        })
    }

    /// Rebuild an engine from journaled bankroll and open positions
    pub fn restore(
        limits: RiskLimits,
        bankroll: Decimal,
        positions: impl IntoIterator<Item = Position>,
    ) -> Result<Self, RiskError> {
        if bankroll < Decimal::ZERO {
            return Err(RiskError::NegativeBankroll(bankroll));
        }
        limits.validate()?;

        let mut open = BTreeMap::new();
        for position in positions {
            let market_id = position.market_id.clone();
            if open.insert(market_id.clone(), position).is_some() {
                return Err(RiskError::DuplicatePosition(market_id));
            }
        }

        Ok(Self {
            limits,
            bankroll,
            positions: open,
            decision_log: vec![],
            outcomes: vec![],
        })
    }

    /// Check a decision against the open-position and risk limits
    pub fn can_execute(&self, decision: &TradeDecision) -> Result<(), Rejection> {
        if self.positions.contains_key(decision.market_id()) {
            return Err(Rejection::PositionAlreadyOpen);
        }
        if self.positions.len() >= self.limits.max_open_positions {
            return Err(Rejection::MaxOpenPositions);
        }
        if decision.risk() > self.limits.risk_cap(self.bankroll) {
            return Err(Rejection::RiskCapExceeded);
        }
        Ok(())
    }

    /// Apply a decision if limits allow
    ///
    /// Every call is recorded in the decision log, filled or not.
    pub fn execute(&mut self, decision: TradeDecision) -> Option<Position> {
        let verdict = self.can_execute(&decision);
        let status = match verdict {
            Ok(()) => ExecutionStatus::Filled,
            Err(reason) => ExecutionStatus::Rejected(reason),
        };

        self.decision_log.push(DecisionRecord {
            decision: decision.clone(),
            status,
        });

        if let Err(reason) = verdict {
            tracing::info!(
                market_id = decision.market_id(),
                price = %decision.price(),
                size = decision.size(),
                reason = %reason,
                "Paper order rejected"
            );
            telemetry::record_rejection(reason);
            return None;
        }

        let risk = decision.risk();
        self.bankroll -= risk;

        let position = Position {
            market_id: decision.market_id().to_string(),
            side: decision.side(),
            entry_price: decision.price(),
            size: decision.size(),
            opened_at: decision.ts(),
        };
        self.positions
            .insert(position.market_id.clone(), position.clone());

        tracing::info!(
            market_id = %position.market_id,
            side = %position.side,
            price = %position.entry_price,
            size = position.size,
            risk = %risk,
            bankroll = %self.bankroll,
            "Paper order filled"
        );
        telemetry::increment_counter(CounterMetric::Fills);
        self.publish_gauges();

        Some(position)
    }

    /// Resolve the open position for a market and realize its PnL
    pub fn settle(&mut self, resolution: &Resolution) -> Result<Outcome, ExecutionError> {
        let market_id = resolution.market_id();
        let position = self
            .positions
            .remove(market_id)
            .ok_or_else(|| ExecutionError::NoOpenPosition(market_id.to_string()))?;

        let payout = position.payout(resolution.resolved_value());
        let pnl = payout - position.risk();
        self.bankroll += payout;

        let outcome = Outcome {
            market_id: position.market_id,
            resolved_value: resolution.resolved_value(),
            pnl,
        };
        self.outcomes.push(outcome.clone());

        tracing::info!(
            market_id = %outcome.market_id,
            resolved_value = outcome.resolved_value,
            payout = %payout,
            pnl = %pnl,
            bankroll = %self.bankroll,
            "Position settled"
        );
        self.publish_gauges();

        Ok(outcome)
    }

    pub fn bankroll(&self) -> Decimal {
        self.bankroll
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// Number of open positions
    pub fn open_position_count(&self) -> usize {
        self.positions.len()
    }

    /// Open position for a market
    pub fn position(&self, market_id: &str) -> Option<&Position> {
        self.positions.get(market_id)
    }

    /// Open positions ordered by market id
    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    /// Every decision seen this run, in order
    pub fn decision_log(&self) -> &[DecisionRecord] {
        &self.decision_log
    }

    /// Outcomes settled this run, in order
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Sum of realized PnL this run
    pub fn realized_pnl(&self) -> Decimal {
        self.outcomes.iter().map(|o| o.pnl).sum()
    }

    fn publish_gauges(&self) {
        telemetry::set_gauge(
            GaugeMetric::Bankroll,
            self.bankroll.to_f64().unwrap_or_default(),
        );
        telemetry::set_gauge(GaugeMetric::OpenPositions, self.positions.len() as f64);
        telemetry::set_gauge(
            GaugeMetric::RealizedPnl,
            self.realized_pnl().to_f64().unwrap_or_default(),
        );
    }
}
