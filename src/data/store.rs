//! SQLite persistence for markets, snapshots, bankroll and trades
//!
//! Decimals are stored as TEXT to keep them exact; timestamps are epoch
//! milliseconds. Multi-row state transitions (fills, settlements) are written
//! in a single transaction.

use super::StoreError;
use crate::market::{Market, Snapshot};
use crate::risk::{Outcome, Position};
use crate::signal::{Side, TradeDecision};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const SCHEMA: [&str; 6] = [
    r#"
    CREATE TABLE IF NOT EXISTS markets (
        id TEXT PRIMARY KEY,
        question TEXT NOT NULL,
        close_time INTEGER NOT NULL,
        resolution_source TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS snapshots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        market_id TEXT NOT NULL,
        ts INTEGER NOT NULL,
        bid TEXT,
        ask TEXT,
        last TEXT,
        volume INTEGER NOT NULL,
        FOREIGN KEY(market_id) REFERENCES markets(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bankroll (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ts INTEGER NOT NULL,
        bankroll TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS trades (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ts INTEGER NOT NULL,
        market_ticker TEXT NOT NULL,
        side TEXT NOT NULL,
        price TEXT NOT NULL,
        size INTEGER NOT NULL,
        pnl TEXT NOT NULL,
        reason TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS positions (
        market_id TEXT PRIMARY KEY,
        side TEXT NOT NULL,
        entry_price TEXT NOT NULL,
        size INTEGER NOT NULL,
        opened_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS outcomes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ts INTEGER NOT NULL,
        market_id TEXT NOT NULL,
        resolved_value INTEGER NOT NULL,
        pnl TEXT NOT NULL
    )
    "#,
];

/// A recorded paper trade
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub ts: DateTime<Utc>,
    pub market_id: String,
    pub side: Side,
    pub price: Decimal,
    pub size: u64,
    pub pnl: Decimal,
    pub reason: String,
}

/// SQLite-backed store
pub struct SqliteStore {
    pool: SqlitePool,
    path: PathBuf,
}

impl SqliteStore {
    /// Open (creating if needed) the database and seed the bankroll
    pub async fn open(
        path: impl AsRef<Path>,
        initial_bankroll: Decimal,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .foreign_keys(true);

        // A single connection serializes all writers
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool, path };
        store.create_tables().await?;
        store.ensure_bankroll_initialized(initial_bankroll).await?;

        tracing::debug!(path = %store.path.display(), "Opened SQLite store");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn create_tables(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert `initial_bankroll` if no bankroll has been recorded
    pub async fn ensure_bankroll_initialized(
        &self,
        initial_bankroll: Decimal,
    ) -> Result<(), StoreError> {
        let existing = sqlx::query("SELECT 1 FROM bankroll LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_none() {
            tracing::info!(bankroll = %initial_bankroll, "Seeding initial bankroll");
            self.record_bankroll(initial_bankroll, Utc::now()).await?;
        }
        Ok(())
    }

    /// Most recently recorded bankroll
    pub async fn get_latest_bankroll(&self) -> Result<Decimal, StoreError> {
        let row = sqlx::query("SELECT bankroll FROM bankroll ORDER BY id DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::MissingBankroll)?;

        decimal_column(&row, "bankroll")
    }

    /// Append a bankroll value
    pub async fn record_bankroll(
        &self,
        bankroll: Decimal,
        ts: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        insert_bankroll(&mut conn, bankroll, ts).await
    }

    /// Append a trade row
    pub async fn record_trade(
        &self,
        decision: &TradeDecision,
        pnl: Decimal,
        size: u64,
        ts: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        insert_trade(&mut conn, decision, pnl, size, ts).await
    }

    /// Journal a fill: trade row, open position and new bankroll, atomically
    pub async fn record_fill(
        &self,
        decision: &TradeDecision,
        position: &Position,
        bankroll: Decimal,
        ts: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        insert_trade(&mut tx, decision, Decimal::ZERO, position.size, ts).await?;
        upsert_position(&mut tx, position).await?;
        insert_bankroll(&mut tx, bankroll, ts).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Journal a settlement: outcome row, position removal and new bankroll, atomically
    pub async fn record_settlement(
        &self,
        outcome: &Outcome,
        bankroll: Decimal,
        ts: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO outcomes (ts, market_id, resolved_value, pnl)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(ts.timestamp_millis())
        .bind(&outcome.market_id)
        .bind(i64::from(outcome.resolved_value))
        .bind(outcome.pnl.to_string())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM positions WHERE market_id = ?")
            .bind(&outcome.market_id)
            .execute(&mut *tx)
            .await?;

        insert_bankroll(&mut tx, bankroll, ts).await?;
        tx.commit().await?;
        Ok(())
    }

    /// All trades, newest first
    pub async fn fetch_trades(&self) -> Result<Vec<TradeRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT ts, market_ticker, side, price, size, pnl, reason
            FROM trades
            ORDER BY ts DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_trade).collect()
    }

    /// Positions journaled as open
    pub async fn fetch_open_positions(&self) -> Result<Vec<Position>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT market_id, side, entry_price, size, opened_at
            FROM positions
            ORDER BY market_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_position).collect()
    }

    /// Settled outcomes, oldest first
    pub async fn fetch_outcomes(&self) -> Result<Vec<Outcome>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT market_id, resolved_value, pnl
            FROM outcomes
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_outcome).collect()
    }

    /// Insert or update a market by id
    pub async fn upsert_market(&self, market: &Market) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO markets (id, question, close_time, resolution_source)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                question = excluded.question,
                close_time = excluded.close_time,
                resolution_source = excluded.resolution_source
            "#,
        )
        .bind(&market.id)
        .bind(&market.question)
        .bind(market.close_time.timestamp_millis())
        .bind(&market.resolution_source)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn upsert_markets(&self, markets: &[Market]) -> Result<(), StoreError> {
        for market in markets {
            self.upsert_market(market).await?;
        }
        Ok(())
    }

    /// Append a snapshot; its market must already be stored
    pub async fn insert_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO snapshots (market_id, ts, bid, ask, last, volume)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(snapshot.market_id())
        .bind(snapshot.ts().timestamp_millis())
        .bind(snapshot.bid().map(|v| v.to_string()))
        .bind(snapshot.ask().map(|v| v.to_string()))
        .bind(snapshot.last().map(|v| v.to_string()))
        .bind(to_i64(snapshot.volume()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Most recent snapshots across all markets
    pub async fn fetch_latest_snapshots(&self, limit: u32) -> Result<Vec<Snapshot>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT market_id, ts, bid, ask, last, volume
            FROM snapshots
            ORDER BY ts DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_snapshot).collect()
    }

    /// Close the connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}

async fn insert_bankroll(
    conn: &mut SqliteConnection,
    bankroll: Decimal,
    ts: DateTime<Utc>,
) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO bankroll (ts, bankroll) VALUES (?, ?)")
        .bind(ts.timestamp_millis())
        .bind(bankroll.to_string())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn insert_trade(
    conn: &mut SqliteConnection,
    decision: &TradeDecision,
    pnl: Decimal,
    size: u64,
    ts: DateTime<Utc>,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO trades (ts, market_ticker, side, price, size, pnl, reason)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(ts.timestamp_millis())
    .bind(decision.market_id())
    .bind(decision.side().as_str())
    .bind(decision.price().to_string())
    .bind(to_i64(size))
    .bind(pnl.to_string())
    .bind(decision.reason())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn upsert_position(
    conn: &mut SqliteConnection,
    position: &Position,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO positions (market_id, side, entry_price, size, opened_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(market_id) DO UPDATE SET
            side = excluded.side,
            entry_price = excluded.entry_price,
            size = excluded.size,
            opened_at = excluded.opened_at
        "#,
    )
    .bind(&position.market_id)
    .bind(position.side.as_str())
    .bind(position.entry_price.to_string())
    .bind(to_i64(position.size))
    .bind(position.opened_at.timestamp_millis())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn parse_decimal(column: &'static str, raw: String) -> Result<Decimal, StoreError> {
    Decimal::from_str(&raw).map_err(|_| StoreError::corrupt(column, raw))
}

fn decimal_column(row: &SqliteRow, column: &'static str) -> Result<Decimal, StoreError> {
    let raw: String = row.try_get(column)?;
    parse_decimal(column, raw)
}

fn optional_decimal_column(
    row: &SqliteRow,
    column: &'static str,
) -> Result<Option<Decimal>, StoreError> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|s| parse_decimal(column, s)).transpose()
}

fn unsigned_column(row: &SqliteRow, column: &'static str) -> Result<u64, StoreError> {
    let raw: i64 = row.try_get(column)?;
    u64::try_from(raw).map_err(|_| StoreError::corrupt(column, raw))
}

fn timestamp_column(row: &SqliteRow, column: &'static str) -> Result<DateTime<Utc>, StoreError> {
    let millis: i64 = row.try_get(column)?;
    DateTime::from_timestamp_millis(millis).ok_or_else(|| StoreError::corrupt(column, millis))
}

fn side_column(row: &SqliteRow, column: &'static str) -> Result<Side, StoreError> {
    let raw: String = row.try_get(column)?;
    Side::from_str(&raw).map_err(|_| StoreError::corrupt(column, raw))
}

fn row_to_trade(row: &SqliteRow) -> Result<TradeRecord, StoreError> {
    Ok(TradeRecord {
        ts: timestamp_column(row, "ts")?,
        market_id: row.try_get("market_ticker")?,
        side: side_column(row, "side")?,
        price: decimal_column(row, "price")?,
        size: unsigned_column(row, "size")?,
        pnl: decimal_column(row, "pnl")?,
        reason: row.try_get("reason")?,
    })
}

fn row_to_position(row: &SqliteRow) -> Result<Position, StoreError> {
    Ok(Position {
        market_id: row.try_get("market_id")?,
        side: side_column(row, "side")?,
        entry_price: decimal_column(row, "entry_price")?,
        size: unsigned_column(row, "size")?,
        opened_at: timestamp_column(row, "opened_at")?,
    })
}

fn row_to_outcome(row: &SqliteRow) -> Result<Outcome, StoreError> {
    let resolved: i64 = row.try_get("resolved_value")?;
    let resolved_value = u8::try_from(resolved)
        .ok()
        .filter(|v| *v <= 1)
        .ok_or_else(|| StoreError::corrupt("resolved_value", resolved))?;

    Ok(Outcome {
        market_id: row.try_get("market_id")?,
        resolved_value,
        pnl: decimal_column(row, "pnl")?,
    })
}

fn row_to_snapshot(row: &SqliteRow) -> Result<Snapshot, StoreError> {
    let market_id: String = row.try_get("market_id")?;
    let volume: i64 = row.try_get("volume")?;

    Ok(Snapshot::new(
        market_id,
        timestamp_column(row, "ts")?,
        optional_decimal_column(row, "bid")?,
        optional_decimal_column(row, "ask")?,
        optional_decimal_column(row, "last")?,
        volume,
    )?)
}
