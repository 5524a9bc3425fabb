use anyhow::Result;

use crate::config::LorekeeperConfig;

/// Rebuild a campaign's chunk index from its current entities.
pub fn reindex(config: &LorekeeperConfig, campaign_id: i64) -> Result<()> {
    let conn = crate::db::open_database(&config.resolved_db_path())?;
    let provider = crate::embedding::create_provider(&config.embedding)?;

    println!("Reindexing campaign {campaign_id}...");
    let saved = crate::campaign::chunks::reindex(&conn, provider.as_ref(), campaign_id)?;
    println!("Indexed {saved} chunk(s).");
    Ok(())
}
