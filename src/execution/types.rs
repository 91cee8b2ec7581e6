//! Execution types

use crate::risk::Rejection;
use crate::signal::TradeDecision;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors returned by the execution engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// Settlement requested for a market with nothing open
    #[error("no open position for market {0}")]
    NoOpenPosition(String),
}

/// Result of one execution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionStatus {
    Filled,
    Rejected(Rejection),
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Filled => f.write_str("filled"),
            ExecutionStatus::Rejected(reason) => write!(f, "rejected:{}", reason),
        }
    }
}

/// One entry of the decision audit log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRecord {
    pub decision: TradeDecision,
    pub status: ExecutionStatus,
}
