//! CLI interface for kakashi
//!
//! Provides subcommands for:
//! - `collect`: Store one pass of markets and snapshots
//! - `run`: Start the paper trading loop
//! - `settle`: Resolve an open position
//! - `trades`: List recorded trades
//! - `status`: Show journaled state
//! - `config`: Show effective configuration

mod collect;
mod run;
mod settle;
mod status;
mod trades;

pub use collect::CollectArgs;
pub use run::RunArgs;
pub use settle::SettleArgs;
pub use status::show_status;
pub use trades::TradesArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kakashi")]
#[command(about = "Kalshi market collector and paper trading simulator")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store one pass of markets and snapshots
    Collect(CollectArgs),
    /// Start paper trading
    Run(RunArgs),
    /// Settle an open position
    Settle(SettleArgs),
    /// List recorded trades, newest first
    Trades(TradesArgs),
    /// Show current state
    Status,
    /// Show configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collect() {
        let args = [
            "kakashi", "collect", "--live", "--limit", "25", "--db", "x.db",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Collect(args) => {
                assert!(args.live);
                assert_eq!(args.limit, Some(25));
                assert_eq!(args.db.as_deref(), Some(std::path::Path::new("x.db")));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.config, "config.toml");
    }

    #[test]
    fn test_parse_settle() {
        let cli = Cli::try_parse_from([
            "kakashi", "--config", "k.toml", "settle", "--market", "M1", "--resolved", "1",
        ])
        .unwrap();
        assert_eq!(cli.config, "k.toml");
        match cli.command {
            Commands::Settle(args) => {
                assert_eq!(args.market, "M1");
                assert_eq!(args.resolved, 1);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_settle_requires_market() {
        let parsed = Cli::try_parse_from(["kakashi", "settle", "--resolved", "1"]);
        assert!(parsed.is_err());
    }
}
