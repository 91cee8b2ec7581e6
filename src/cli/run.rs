//! Run command implementation

use crate::config::Config;
use crate::market;
use crate::runner::{CycleReport, Runner};
use clap::Args;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Use the Kalshi API instead of sample data
    #[arg(long)]
    pub live: bool,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let source = market::source_from_config(&config.api, self.live || config.api.live)?;
        let mut runner = Runner::bootstrap(config, source).await?;

        if self.once {
            match runner.run_cycle().await? {
                CycleReport::Skipped => println!("Kill switch engaged; cycle skipped"),
                CycleReport::Completed(stats) => println!(
                    "Cycle complete: {} markets, {} snapshots, {} decisions, {} fills",
                    stats.markets, stats.snapshots, stats.decisions, stats.fills
                ),
            }
        } else {
            let interval = Duration::from_secs(config.runner.interval_secs.max(1));
            let cycles = runner.run(interval, config.runner.max_cycles).await?;
            tracing::info!(cycles, "Decision loop stopped");
        }

        println!("Bankroll: {}", runner.trader().bankroll());
        runner.shutdown().await;
        Ok(())
    }
}
