//! Risk management module
//!
//! Positions, outcomes, and the limits the execution engine enforces

mod limits;
mod position;
mod types;

pub use limits::RiskLimits;
pub use position::{Outcome, Position, Resolution};
pub use types::{Rejection, RiskError};
