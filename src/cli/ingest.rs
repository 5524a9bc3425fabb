use std::path::Path;

use anyhow::{Context, Result};

use crate::campaign::analysis::SessionAnalysis;
use crate::campaign::ingest::run_ingestion;
use crate::campaign::store;
use crate::campaign::types::ProcessingStatus;
use crate::config::LorekeeperConfig;
use crate::llm::{self, GenerationClient};

/// Analyze a transcript file and ingest the result into a session.
///
/// With `--analysis`, a pre-computed analysis JSON file is ingested instead
/// and no generation call is made. Re-running on the same session replaces
/// its previous analysis rows.
pub fn ingest(
    config: &LorekeeperConfig,
    session_id: i64,
    transcript: Option<&Path>,
    analysis_file: Option<&Path>,
) -> Result<()> {
    let conn = crate::db::open_database(&config.resolved_db_path())?;

    store::set_session_status(&conn, session_id, ProcessingStatus::Uploaded, None)?;

    let analysis = match (analysis_file, transcript) {
        (Some(path), _) => read_analysis(path)?,
        (None, None) => anyhow::bail!("provide a transcript file or --analysis"),
        (None, Some(transcript)) => {
            let text = std::fs::read_to_string(transcript)
                .with_context(|| format!("failed to read transcript: {}", transcript.display()))?;
            println!("Analyzing transcript ({} chars)...", text.len());

            let client = GenerationClient::new(&config.generation)?;
            match client.analyze_session(&text) {
                Ok(analysis) => analysis,
                Err(err) => {
                    store::set_session_status(
                        &conn,
                        session_id,
                        ProcessingStatus::Error,
                        Some(&err.to_string()),
                    )?;
                    return Err(err.into());
                }
            }
        }
    };

    // Drop rows from any earlier run so edits to the transcript take effect.
    store::clear_session_analysis(&conn, session_id)?;

    let provider = crate::embedding::create_provider(&config.embedding)?;
    let report = run_ingestion(&conn, provider.as_ref(), session_id, &analysis)?;

    println!("Session {session_id} ingested:");
    println!(
        "  personas:   {} new, {} matched",
        report.personas_created, report.personas_matched
    );
    println!("  highlights: {}", report.highlights_added);
    println!("  quotes:     {}", report.quotes_added);
    println!("  moments:    {}", report.moments_added);
    println!("  chunks:     {}", report.chunks_saved);
    Ok(())
}

fn read_analysis(path: &Path) -> Result<SessionAnalysis> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read analysis file: {}", path.display()))?;
    Ok(llm::parse_analysis(&raw)?)
}
