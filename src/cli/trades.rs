//! Trades command implementation

use crate::config::Config;
use crate::data::SqliteStore;
use clap::Args;

#[derive(Args, Debug)]
pub struct TradesArgs {
    /// Show at most this many trades
    #[arg(long)]
    pub limit: Option<usize>,
}

impl TradesArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let store = SqliteStore::open(&config.store.db_path, config.risk.initial_bankroll).await?;
        let trades = store.fetch_trades().await?;

        if trades.is_empty() {
            println!("No trades recorded");
        }

        for trade in trades.iter().take(self.limit.unwrap_or(usize::MAX)) {
            println!(
                "{}  {:<24} {:<3} {:>6} x {:<6} pnl {:>8}  {}",
                trade.ts.format("%Y-%m-%d %H:%M:%S"),
                trade.market_id,
                trade.side,
                trade.price,
                trade.size,
                trade.pnl,
                trade.reason
            );
        }

        store.close().await;
        Ok(())
    }
}
