use clap::Parser;
use kakashi::cli::{self, Cli, Commands};
use kakashi::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    kakashi::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Collect(args) => {
            tracing::info!("Starting data collection");
            args.execute(&config).await?;
        }
        Commands::Run(args) => {
            tracing::info!("Starting paper trading mode");
            args.execute(&config).await?;
        }
        Commands::Settle(args) => {
            args.execute(&config).await?;
        }
        Commands::Trades(args) => {
            args.execute(&config).await?;
        }
        Commands::Status => {
            cli::show_status(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!(
                "  Risk: per_trade={}, max_open={}, edge_threshold={}, initial_bankroll={}",
                config.risk.risk_per_trade,
                config.risk.max_open_positions,
                config.risk.edge_threshold,
                config.risk.initial_bankroll
            );
            println!(
                "  Api: base_url={}, timeout={}s, retries={}, page_limit={}, live={}",
                config.api.base_url.as_deref().unwrap_or("(env/default)"),
                config.api.timeout_secs,
                config.api.retries,
                config.api.page_limit,
                config.api.live
            );
            println!("  Store: {}", config.store.db_path.display());
            println!(
                "  Runner: interval={}s, kill_switch={}, max_cycles={:?}",
                config.runner.interval_secs,
                config.runner.kill_switch_path.display(),
                config.runner.max_cycles
            );
            println!(
                "  Telemetry: level={}, format={:?}, metrics_port={:?}",
                config.telemetry.log_level,
                config.telemetry.log_format,
                config.telemetry.metrics_port
            );
        }
    }

    Ok(())
}
