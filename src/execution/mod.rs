//! Execution engine module
//!
//! Risk-capped paper execution and settlement

mod paper;
mod types;

pub use paper::PaperTrader;
pub use types::{DecisionRecord, ExecutionError, ExecutionStatus};
