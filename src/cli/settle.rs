//! Settle command implementation

use crate::config::Config;
use crate::market;
use crate::risk::Resolution;
use crate::runner::Runner;
use clap::Args;

#[derive(Args, Debug)]
pub struct SettleArgs {
    /// Market identifier of the open position
    #[arg(long)]
    pub market: String,

    /// Resolved value: 1 for YES, 0 for NO
    #[arg(long)]
    pub resolved: i64,
}

impl SettleArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let resolution = Resolution::new(self.market.as_str(), self.resolved)?;

        // Settlement never fetches, so the offline source is enough
        let source = market::source_from_config(&config.api, false)?;
        let mut runner = Runner::bootstrap(config, source).await?;

        let outcome = runner.settle(&resolution).await?;
        println!(
            "Settled {} at {}: pnl {}, bankroll {}",
            outcome.market_id,
            outcome.resolved_value,
            outcome.pnl,
            runner.trader().bankroll()
        );

        runner.shutdown().await;
        Ok(())
    }
}
