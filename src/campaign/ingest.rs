//! Ingestion orchestrator: drives a session-analysis payload through
//! resolution, persistence, and indexing.
//!
//! One logical worker per job; resolution, writes, and chunk pushes run
//! sequentially. The per-session boundary in [`run_ingestion`] marks the
//! session `error` with the captured message on any failure and leaves
//! partially written rows in place. That is a last-writer-wins simplicity
//! trade-off, not a transactional guarantee: re-running the job is the
//! recovery path, and every insert dedups.

use rusqlite::Connection;
use serde::Serialize;
use tracing::{error, info};

use crate::campaign::analysis::{HighlightEntry, PersonaMention, SessionAnalysis};
use crate::campaign::chunks::{self, ChunkOutcome};
use crate::campaign::resolve::{self, Candidate, Resolution};
use crate::campaign::store::{self, NewPersona};
use crate::campaign::types::{HighlightKind, Persona, ProcessingStatus, SourceType};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;

/// Counters from one ingestion job.
#[derive(Debug, Default, Clone, Serialize)]
pub struct IngestReport {
    pub personas_created: usize,
    pub personas_matched: usize,
    pub highlights_added: usize,
    pub quotes_added: usize,
    pub moments_added: usize,
    pub chunks_saved: usize,
}

/// Ingest one session-analysis payload.
///
/// On any failure the session is stamped `error` with the captured message
/// and the error is returned; rows written before the failure remain.
pub fn run_ingestion(
    conn: &Connection,
    provider: &dyn EmbeddingProvider,
    session_id: i64,
    analysis: &SessionAnalysis,
) -> Result<IngestReport> {
    match ingest_session(conn, provider, session_id, analysis) {
        Ok(report) => {
            info!(session_id, ?report, "ingestion complete");
            Ok(report)
        }
        Err(err) => {
            error!(session_id, error = %err, "ingestion failed");
            // Best effort: the session itself may be the missing record.
            let _ = store::set_session_status(
                conn,
                session_id,
                ProcessingStatus::Error,
                Some(&err.to_string()),
            );
            Err(err)
        }
    }
}

fn ingest_session(
    conn: &Connection,
    provider: &dyn EmbeddingProvider,
    session_id: i64,
    analysis: &SessionAnalysis,
) -> Result<IngestReport> {
    let session = store::get_session(conn, session_id)?;
    let campaign_id = session.campaign_id;
    let mut report = IngestReport::default();

    // ── Resolving ────────────────────────────────────────────────────────
    store::set_session_status(conn, session_id, ProcessingStatus::Resolving, None)?;

    let mut roster = store::load_roster(conn, campaign_id)?;
    // (persona id, mention) pairs carried into the persisting phase.
    let mut resolved: Vec<(i64, &PersonaMention)> = Vec::new();

    for mention in &analysis.personas {
        let candidates: Vec<Candidate> = roster
            .iter()
            .map(|p| Candidate { id: p.id, name: p.name.clone(), aliases: p.aliases.clone() })
            .collect();

        let persona_id = match resolve::resolve(&mention.name, &candidates) {
            Resolution::Existing(id) => {
                report.personas_matched += 1;
                // Resolved ids always come from the roster.
                if let Some(persona) = roster.iter_mut().find(|p| p.id == id) {
                    if apply_mention(persona, mention) {
                        store::update_persona(conn, persona)?;
                    }
                }
                id
            }
            Resolution::CreateNew => {
                report.personas_created += 1;
                let id = store::insert_persona(
                    conn,
                    campaign_id,
                    Some(session_id),
                    &new_persona_from(mention),
                )?;
                // Later mentions in this payload may resolve to the new record.
                roster.push(store::get_persona(conn, id)?);
                id
            }
        };
        resolved.push((persona_id, mention));
    }

    // ── Persisting ───────────────────────────────────────────────────────
    store::set_session_status(conn, session_id, ProcessingStatus::Persisting, None)?;

    for (persona_id, mention) in &resolved {
        report.highlights_added += insert_highlights(
            conn,
            session_id,
            campaign_id,
            Some(*persona_id),
            Some(&mention.name),
            HighlightKind::High,
            &mention.highlights,
        )?;
        report.highlights_added += insert_highlights(
            conn,
            session_id,
            campaign_id,
            Some(*persona_id),
            Some(&mention.name),
            HighlightKind::Low,
            &mention.low_points,
        )?;
    }

    // Session-level highlights and low points carry no persona link.
    for (kind, entries) in [
        (HighlightKind::High, &analysis.highlights),
        (HighlightKind::Low, &analysis.low_points),
    ] {
        for entry in entries {
            if store::insert_highlight_if_new(
                conn,
                session_id,
                campaign_id,
                None,
                entry.name(),
                kind,
                entry.text(),
            )? {
                report.highlights_added += 1;
            }
        }
    }

    for quote in &analysis.memorable_quotes {
        let speaker = quote.speaker();
        // Exact case-insensitive name match only; no fuzzy linking for quotes.
        let persona_id = roster
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(speaker))
            .map(|p| p.id);
        if store::insert_quote_if_new(
            conn,
            session_id,
            campaign_id,
            persona_id,
            Some(speaker),
            quote.text(),
        )? {
            report.quotes_added += 1;
        }
    }

    for moment in &analysis.moments {
        if store::insert_moment_if_new(conn, session_id, &moment.title, &moment.description)? {
            report.moments_added += 1;
        }
    }

    store::update_session_summary(conn, session_id, &analysis.summary)?;

    // ── Indexing ─────────────────────────────────────────────────────────
    store::set_session_status(conn, session_id, ProcessingStatus::Indexing, None)?;

    if !analysis.summary.trim().is_empty() {
        let text = chunks::session_summary_chunk_text(&session.name, &analysis.summary);
        if chunks::save_chunk(
            conn,
            provider,
            campaign_id,
            SourceType::SessionSummary,
            session_id,
            &text,
        )? == ChunkOutcome::Saved
        {
            report.chunks_saved += 1;
        }
    }

    let mut indexed: Vec<i64> = Vec::new();
    for (persona_id, _) in &resolved {
        if indexed.contains(persona_id) {
            continue;
        }
        indexed.push(*persona_id);
        // Re-read so the chunk reflects updates applied this run.
        let persona = store::get_persona(conn, *persona_id)?;
        let text = chunks::persona_chunk_text(&persona);
        if chunks::save_chunk(conn, provider, campaign_id, SourceType::Persona, persona.id, &text)?
            == ChunkOutcome::Saved
        {
            report.chunks_saved += 1;
        }
    }

    store::set_session_status(conn, session_id, ProcessingStatus::Completed, None)?;
    Ok(report)
}

/// Non-destructive update of an existing persona from a mention.
///
/// Name, description, summary, and aliases are never touched (existing wins).
/// Voice and player name fill in only when missing. The remaining descriptive
/// attributes track current state and take any non-empty incoming value.
/// Returns `true` if anything changed.
fn apply_mention(persona: &mut Persona, mention: &PersonaMention) -> bool {
    let mut changed = false;

    changed |= fill_if_missing(&mut persona.voice_description, mention.voice_description.as_deref());
    changed |= fill_if_missing(&mut persona.player_name, mention.player_name.as_deref());

    changed |= take_incoming(&mut persona.gender, mention.gender.as_deref());
    changed |= take_incoming(&mut persona.race, mention.race.as_deref());
    changed |= take_incoming(&mut persona.class, mention.class.as_deref());
    changed |= take_incoming(&mut persona.alignment, mention.alignment.as_deref());
    changed |= take_incoming(&mut persona.faction, mention.faction.as_deref());

    if let Some(level) = mention.level {
        if persona.level != Some(level) {
            persona.level = Some(level);
            changed = true;
        }
    }
    if let Some(status) = non_empty(mention.status.as_deref()) {
        if persona.status != status {
            persona.status = status.to_string();
            changed = true;
        }
    }

    changed
}

fn fill_if_missing(slot: &mut Option<String>, incoming: Option<&str>) -> bool {
    let empty = slot.as_deref().map(|s| s.trim().is_empty()).unwrap_or(true);
    match (empty, non_empty(incoming)) {
        (true, Some(value)) => {
            *slot = Some(value.to_string());
            true
        }
        _ => false,
    }
}

fn take_incoming(slot: &mut Option<String>, incoming: Option<&str>) -> bool {
    match non_empty(incoming) {
        Some(value) if slot.as_deref() != Some(value) => {
            *slot = Some(value.to_string());
            true
        }
        _ => false,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn new_persona_from(mention: &PersonaMention) -> NewPersona {
    NewPersona {
        name: mention.name.clone(),
        role: mention.role,
        description: mention.description.clone(),
        voice_description: mention.voice_description.clone(),
        gender: mention.gender.clone(),
        race: mention.race.clone(),
        class: mention.class.clone(),
        level: mention.level,
        alignment: mention.alignment.clone(),
        status: mention.status.clone(),
        faction: mention.faction.clone(),
        aliases: mention.aliases.clone(),
        player_name: mention.player_name.clone(),
        summary: None,
    }
}

fn insert_highlights(
    conn: &Connection,
    session_id: i64,
    campaign_id: i64,
    persona_id: Option<i64>,
    default_name: Option<&str>,
    kind: HighlightKind,
    entries: &[HighlightEntry],
) -> Result<usize> {
    let mut added = 0;
    for entry in entries {
        let name = entry.name().or(default_name);
        if store::insert_highlight_if_new(
            conn,
            session_id,
            campaign_id,
            persona_id,
            name,
            kind,
            entry.text(),
        )? {
            added += 1;
        }
    }
    Ok(added)
}
