//! Collect command implementation

use crate::config::Config;
use crate::data::SqliteStore;
use crate::market;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Use the Kalshi API instead of sample data
    #[arg(long)]
    pub live: bool,

    /// Markets per page when collecting live
    #[arg(long)]
    pub limit: Option<u32>,

    /// SQLite database path (overrides `store.db_path`)
    #[arg(long)]
    pub db: Option<PathBuf>,
}

impl CollectArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut api = config.api.clone();
        if let Some(limit) = self.limit {
            api.page_limit = limit;
        }
        let db_path = self.db.as_ref().unwrap_or(&config.store.db_path);

        let source = market::source_from_config(&api, self.live || api.live)?;
        let store = SqliteStore::open(db_path, config.risk.initial_bankroll).await?;

        let batch = source.fetch().await?;
        store.upsert_markets(&batch.markets).await?;
        for snapshot in &batch.snapshots {
            store.insert_snapshot(snapshot).await?;
            println!("Snapshot saved for {}", snapshot.market_id());
        }

        tracing::info!(
            markets = batch.markets.len(),
            snapshots = batch.snapshots.len(),
            db = %db_path.display(),
            "Collection complete"
        );

        store.close().await;
        Ok(())
    }
}
