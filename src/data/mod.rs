//! Persistence module
//!
//! Journals markets, snapshots, bankroll history, trades, open positions
//! and settlement outcomes to SQLite

mod store;

pub use store::{SqliteStore, TradeRecord};

use crate::market::ValidationError;
use thiserror::Error;

/// Persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt value in column {column}: {value}")]
    Corrupt { column: &'static str, value: String },

    #[error("stored snapshot is invalid: {0}")]
    Invalid(#[from] ValidationError),

    #[error("no bankroll recorded")]
    MissingBankroll,
}

impl StoreError {
    pub(crate) fn corrupt(column: &'static str, value: impl ToString) -> Self {
        Self::Corrupt {
            column,
            value: value.to_string(),
        }
    }
}
