//! Status command implementation

use crate::config::Config;
use crate::data::SqliteStore;
use crate::runner::KillSwitch;
use rust_decimal::Decimal;

/// Print bankroll, open positions and realized PnL from the journal
pub async fn show_status(config: &Config) -> anyhow::Result<()> {
    let store = SqliteStore::open(&config.store.db_path, config.risk.initial_bankroll).await?;

    let bankroll = store.get_latest_bankroll().await?;
    let positions = store.fetch_open_positions().await?;
    let realized: Decimal = store.fetch_outcomes().await?.iter().map(|o| o.pnl).sum();
    let kill_switch = KillSwitch::new(&config.runner.kill_switch_path);
    let kill_state = if kill_switch.is_engaged() {
        "ENGAGED"
    } else {
        "off"
    };

    println!("kakashi status");
    println!("  Database: {}", store.path().display());
    println!("  Bankroll: {}", bankroll);
    println!("  Realized PnL: {}", realized);
    println!("  Kill switch: {}", kill_state);
    println!("  Open positions: {}", positions.len());
    for position in &positions {
        println!(
            "    {} {} {} @ {} (risk {})",
            position.market_id,
            position.side,
            position.size,
            position.entry_price,
            position.risk()
        );
    }

    store.close().await;
    Ok(())
}
