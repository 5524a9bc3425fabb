pub mod ingest;
pub mod merge;
pub mod reindex;
pub mod search;
pub mod stats;

use anyhow::Result;

use crate::campaign::store;
use crate::config::LorekeeperConfig;

/// Create a campaign and print its id.
pub fn campaign_add(
    config: &LorekeeperConfig,
    name: &str,
    description: Option<&str>,
) -> Result<()> {
    let conn = crate::db::open_database(&config.resolved_db_path())?;
    let id = store::create_campaign(&conn, name, description)?;
    println!("Created campaign {id}: {name}");
    Ok(())
}

/// List all campaigns.
pub fn campaign_list(config: &LorekeeperConfig) -> Result<()> {
    let conn = crate::db::open_database(&config.resolved_db_path())?;
    let campaigns = store::list_campaigns(&conn)?;

    if campaigns.is_empty() {
        println!("No campaigns yet.");
        return Ok(());
    }

    for campaign in campaigns {
        match campaign.description.as_deref() {
            Some(desc) => println!("  {}. {} - {}", campaign.id, campaign.name, desc),
            None => println!("  {}. {}", campaign.id, campaign.name),
        }
    }
    Ok(())
}

/// Create a session within a campaign and print its id.
pub fn session_add(config: &LorekeeperConfig, campaign_id: i64, name: &str) -> Result<()> {
    let conn = crate::db::open_database(&config.resolved_db_path())?;
    let id = store::create_session(&conn, campaign_id, name)?;
    println!("Created session {id}: {name}");
    Ok(())
}

/// List a campaign's sessions with their processing status.
pub fn session_list(config: &LorekeeperConfig, campaign_id: i64) -> Result<()> {
    let conn = crate::db::open_database(&config.resolved_db_path())?;
    let sessions = store::list_sessions(&conn, campaign_id)?;

    if sessions.is_empty() {
        println!("No sessions in campaign {campaign_id}.");
        return Ok(());
    }

    for session in sessions {
        print!("  {}. {} [{}]", session.id, session.name, session.status);
        if let Some(err) = session.error_message.as_deref() {
            print!(" - {err}");
        }
        println!();
    }
    Ok(())
}
