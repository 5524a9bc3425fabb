//! Merge engine: combine two persona records identified as the same entity.
//!
//! Target's populated fields always win; narrative text is appended rather
//! than replaced. All effects (reassignment of highlights and quotes, field
//! merging, source deletion) run inside one transaction.

use rusqlite::{params, Connection};
use tracing::info;

use crate::campaign::store;
use crate::campaign::types::Persona;
use crate::error::{Error, Result};

/// Merge `source_id` into `target_id` and delete the source.
///
/// Both personas must exist; `NotFound` is returned before any mutation.
/// Highlights and quotes owned by the source are reassigned to the target.
/// The target's `voice_description` is filled from the source only when
/// empty. The source's summary is appended as a marked block unless it is
/// empty, the literal "None", or already contained in the target's summary,
/// so repeated merges do not duplicate text.
pub fn merge_personas(conn: &mut Connection, target_id: i64, source_id: i64) -> Result<Persona> {
    // Fetch both up front; a missing record aborts before any write.
    let mut target = store::get_persona(conn, target_id)?;
    let source = store::get_persona(conn, source_id)?;

    let tx = conn.transaction()?;

    // 1. Reassign dependents
    tx.execute(
        "UPDATE highlights SET persona_id = ?1 WHERE persona_id = ?2",
        params![target_id, source_id],
    )?;
    tx.execute(
        "UPDATE quotes SET persona_id = ?1 WHERE persona_id = ?2",
        params![target_id, source_id],
    )?;

    // 2. Fill voice description only if the target's is empty
    if is_blank(target.voice_description.as_deref()) {
        if let Some(voice) = source.voice_description.as_deref() {
            if !voice.trim().is_empty() {
                target.voice_description = Some(voice.to_string());
            }
        }
    }

    // 3. Append the source summary as a marked block
    if let Some(source_summary) = source.summary.as_deref() {
        let source_summary = source_summary.trim();
        let already_present = target
            .summary
            .as_deref()
            .map(|s| s.contains(source_summary))
            .unwrap_or(false);
        if !source_summary.is_empty() && source_summary != "None" && !already_present {
            let block = format!("[Merged from {}] {}", source.name, source_summary);
            target.summary = Some(match target.summary.as_deref() {
                Some(existing) if !existing.trim().is_empty() => {
                    format!("{existing}\n{block}")
                }
                _ => block,
            });
        }
    }

    tx.execute(
        "UPDATE personas SET voice_description = ?1, summary = ?2 WHERE id = ?3",
        params![target.voice_description, target.summary, target_id],
    )?;

    // 4. Delete the source record
    let deleted = tx.execute("DELETE FROM personas WHERE id = ?1", params![source_id])?;
    if deleted == 0 {
        return Err(Error::not_found("persona", source_id));
    }

    tx.commit()?;
    info!(target_id, source_id, source_name = %source.name, "personas merged");

    store::get_persona(conn, target_id)
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|s| s.trim().is_empty()).unwrap_or(true)
}
