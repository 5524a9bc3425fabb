use anyhow::Result;

use crate::config::LorekeeperConfig;

/// Merge one persona into another and delete the source.
pub fn merge(config: &LorekeeperConfig, target_id: i64, source_id: i64) -> Result<()> {
    let mut conn = crate::db::open_database(&config.resolved_db_path())?;

    let merged = crate::campaign::merge::merge_personas(&mut conn, target_id, source_id)?;

    println!("Merged persona {source_id} into {target_id} ({}).", merged.name);
    if let Some(summary) = merged.summary.as_deref() {
        println!("Summary:\n{summary}");
    }
    Ok(())
}
