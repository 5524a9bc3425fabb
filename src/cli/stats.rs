use anyhow::Result;

use crate::campaign::store;
use crate::config::LorekeeperConfig;

/// Display campaign statistics in the terminal.
pub fn stats(config: &LorekeeperConfig, campaign_id: i64) -> Result<()> {
    let conn = crate::db::open_database(&config.resolved_db_path())?;

    let campaign = store::get_campaign(&conn, campaign_id)?;
    let stats = store::campaign_stats(&conn, campaign_id)?;

    println!("Campaign: {}", campaign.name);
    println!("{}", "=".repeat(40));
    println!("  Sessions:   {}", stats.sessions);
    println!("  Personas:   {}", stats.personas);
    println!("  Highlights: {}", stats.highlights);
    println!("  Quotes:     {}", stats.quotes);
    println!("  Moments:    {}", stats.moments);
    println!("  Chunks:     {}", stats.chunks);
    Ok(())
}
