//! Chunk store: the derived retrieval projection.
//!
//! [`save_chunk`] is the single write path. It rejects fragments too short to
//! be useful for similarity search, checks for an identical existing chunk
//! before calling the embedding provider (so re-running ingestion on
//! unchanged data costs no embedding requests), and inserts the text with its
//! JSON-encoded vector. [`reindex`] purges and rebuilds a campaign's whole
//! chunk set from current entity state.

use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::campaign::store;
use crate::campaign::types::{Persona, SourceType};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;

/// Trimmed text shorter than this (in characters, not bytes) is skipped;
/// short fragments pollute similarity search.
pub const MIN_CHUNK_CHARS: usize = 10;

/// Outcome of a [`save_chunk`] call. Skips are expected, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    Saved,
    /// Trimmed text was under [`MIN_CHUNK_CHARS`].
    SkippedShort,
    /// An identical `(campaign, source_type, source_id, text)` chunk exists.
    SkippedDuplicate,
}

/// Embed and store one chunk of campaign text.
///
/// The duplicate check runs before the provider call: a second save of
/// identical text is a no-op and makes no embedding request.
pub fn save_chunk(
    conn: &Connection,
    provider: &dyn EmbeddingProvider,
    campaign_id: i64,
    source_type: SourceType,
    source_id: i64,
    text: &str,
) -> Result<ChunkOutcome> {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_CHUNK_CHARS {
        debug!(campaign_id, %source_type, source_id, "chunk too short, skipped");
        return Ok(ChunkOutcome::SkippedShort);
    }

    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM chunks \
         WHERE campaign_id = ?1 AND source_type = ?2 AND source_id = ?3 AND text_content = ?4",
        params![campaign_id, source_type.as_str(), source_id, text],
        |row| row.get(0),
    )?;
    if exists {
        debug!(campaign_id, %source_type, source_id, "identical chunk exists, skipped");
        return Ok(ChunkOutcome::SkippedDuplicate);
    }

    let embedding = provider.embed(text)?;
    let embedding_json = serde_json::to_string(&embedding)?;
    let now = chrono::Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO chunks (campaign_id, source_type, source_id, text_content, embedding, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![campaign_id, source_type.as_str(), source_id, text, embedding_json, now],
    )?;

    Ok(ChunkOutcome::Saved)
}

/// Purge and rebuild the campaign's chunk set from current entity state.
///
/// Rebuild order: personas, session summaries, moments, quotes, highlights.
/// Callers should serialize this against ingestion for the same campaign; a
/// save racing the purge may be dropped or duplicated.
pub fn reindex(
    conn: &Connection,
    provider: &dyn EmbeddingProvider,
    campaign_id: i64,
) -> Result<usize> {
    // Verify the campaign exists before purging anything.
    store::get_campaign(conn, campaign_id)?;

    conn.execute("DELETE FROM chunks WHERE campaign_id = ?1", params![campaign_id])?;

    let mut saved = 0usize;
    let mut push = |outcome: ChunkOutcome| {
        if outcome == ChunkOutcome::Saved {
            saved += 1;
        }
    };

    for persona in store::load_roster(conn, campaign_id)? {
        let text = persona_chunk_text(&persona);
        push(save_chunk(conn, provider, campaign_id, SourceType::Persona, persona.id, &text)?);
    }

    for session in store::list_sessions(conn, campaign_id)? {
        if let Some(summary) = session.summary.as_deref() {
            let text = session_summary_chunk_text(&session.name, summary);
            push(save_chunk(
                conn,
                provider,
                campaign_id,
                SourceType::SessionSummary,
                session.id,
                &text,
            )?);
        }

        for moment in store::list_moments_for_session(conn, session.id)? {
            let text = format!(
                "Moment in {}: {} - {}",
                session.name, moment.title, moment.description
            );
            push(save_chunk(conn, provider, campaign_id, SourceType::Moment, moment.id, &text)?);
        }

        for quote in store::list_quotes_for_session(conn, session.id)? {
            let speaker = quote.speaker_name.as_deref().unwrap_or("Unknown");
            let text = format!("Quote in {} by {}: {}", session.name, speaker, quote.text);
            push(save_chunk(conn, provider, campaign_id, SourceType::Quote, quote.id, &text)?);
        }

        for highlight in store::list_highlights_for_session(conn, session.id)? {
            let text = format!("Highlight in {}: {}", session.name, highlight.text);
            push(save_chunk(
                conn,
                provider,
                campaign_id,
                SourceType::Highlight,
                highlight.id,
                &text,
            )?);
        }
    }

    info!(campaign_id, saved, "reindex complete");
    Ok(saved)
}

/// Rich one-line rendering of a persona for indexing.
pub fn persona_chunk_text(persona: &Persona) -> String {
    let mut details = vec![format!("Role: {}", persona.role)];
    if let Some(gender) = persona.gender.as_deref() {
        details.push(format!("Gender: {gender}"));
    }
    if let Some(race) = persona.race.as_deref() {
        details.push(format!("Race: {race}"));
    }
    if let Some(class) = persona.class.as_deref() {
        details.push(format!("Class: {class}"));
    }

    format!(
        "Character: {}. {}. {} {}",
        persona.name,
        details.join(" | "),
        persona.description.as_deref().unwrap_or(""),
        persona.summary.as_deref().unwrap_or(""),
    )
}

pub fn session_summary_chunk_text(session_name: &str, summary: &str) -> String {
    format!("Session {session_name} Summary: {summary}")
}

pub fn chunk_count(conn: &Connection, campaign_id: i64) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM chunks WHERE campaign_id = ?1",
        params![campaign_id],
        |row| row.get(0),
    )?)
}
