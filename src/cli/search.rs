use anyhow::Result;

use crate::config::LorekeeperConfig;

/// Run a semantic search from the terminal.
pub fn search(
    config: &LorekeeperConfig,
    campaign_id: i64,
    query: &str,
    limit: Option<usize>,
) -> Result<()> {
    let conn = crate::db::open_database(&config.resolved_db_path())?;
    let provider = crate::embedding::create_provider(&config.embedding)?;

    let limit = limit.unwrap_or(config.retrieval.default_limit);
    let results =
        crate::campaign::search::search(&conn, provider.as_ref(), query, campaign_id, limit)?;

    if results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        println!(
            "  {}. [{}:{}] (score: {:.4})",
            i + 1,
            result.source_type,
            result.source_id,
            result.score,
        );
        println!("     {}", preview(&result.text, 120));
        println!();
    }
    Ok(())
}

fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
