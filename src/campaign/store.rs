//! Persistence for primary campaign records.
//!
//! Thin CRUD and query helpers over the `campaigns`, `sessions`, `personas`,
//! `highlights`, `quotes`, and `moments` tables. Duplicate-aware insert
//! helpers back the ingestion dedup rules (exact text within a session).
//! Missing records surface as [`Error::NotFound`] before any mutation.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::campaign::types::{
    parse_aliases, Highlight, HighlightKind, Moment, Persona, ProcessingStatus, Quote, Role,
    Session,
};
use crate::error::{Error, Result};

/// Field set for creating a persona. Mirrors the persona columns minus the
/// generated id and timestamp.
#[derive(Debug, Clone, Default)]
pub struct NewPersona {
    pub name: String,
    pub role: Option<Role>,
    pub description: Option<String>,
    pub voice_description: Option<String>,
    pub gender: Option<String>,
    pub race: Option<String>,
    pub class: Option<String>,
    pub level: Option<i64>,
    pub alignment: Option<String>,
    pub status: Option<String>,
    pub faction: Option<String>,
    pub aliases: Vec<String>,
    pub player_name: Option<String>,
    pub summary: Option<String>,
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

// ── Campaigns ────────────────────────────────────────────────────────────────

pub fn create_campaign(conn: &Connection, name: &str, description: Option<&str>) -> Result<i64> {
    conn.execute(
        "INSERT INTO campaigns (name, description, created_at) VALUES (?1, ?2, ?3)",
        params![name, description, now()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_campaign(conn: &Connection, campaign_id: i64) -> Result<crate::campaign::types::Campaign> {
    conn.query_row(
        "SELECT id, name, description, summary, created_at FROM campaigns WHERE id = ?1",
        params![campaign_id],
        |row| {
            Ok(crate::campaign::types::Campaign {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                summary: row.get(3)?,
                created_at: row.get(4)?,
            })
        },
    )
    .optional()?
    .ok_or(Error::not_found("campaign", campaign_id))
}

pub fn list_campaigns(conn: &Connection) -> Result<Vec<crate::campaign::types::Campaign>> {
    let mut stmt =
        conn.prepare("SELECT id, name, description, summary, created_at FROM campaigns ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(crate::campaign::types::Campaign {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                summary: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Sessions ─────────────────────────────────────────────────────────────────

pub fn create_session(conn: &Connection, campaign_id: i64, name: &str) -> Result<i64> {
    // Verify the campaign exists so the error is a NotFound, not an FK failure.
    get_campaign(conn, campaign_id)?;
    conn.execute(
        "INSERT INTO sessions (campaign_id, name, status, created_at) VALUES (?1, ?2, 'pending', ?3)",
        params![campaign_id, name, now()],
    )?;
    Ok(conn.last_insert_rowid())
}

fn session_from_row(row: &Row) -> rusqlite::Result<Session> {
    let status: String = row.get(4)?;
    Ok(Session {
        id: row.get(0)?,
        campaign_id: row.get(1)?,
        name: row.get(2)?,
        summary: row.get(3)?,
        status: status.parse::<ProcessingStatus>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, e.into())
        })?,
        error_message: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub fn get_session(conn: &Connection, session_id: i64) -> Result<Session> {
    conn.query_row(
        "SELECT id, campaign_id, name, summary, status, error_message, created_at \
         FROM sessions WHERE id = ?1",
        params![session_id],
        session_from_row,
    )
    .optional()?
    .ok_or(Error::not_found("session", session_id))
}

pub fn list_sessions(conn: &Connection, campaign_id: i64) -> Result<Vec<Session>> {
    let mut stmt = conn.prepare(
        "SELECT id, campaign_id, name, summary, status, error_message, created_at \
         FROM sessions WHERE campaign_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![campaign_id], session_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Stamp the session's processing status. Clears any stored error message
/// unless one is supplied.
pub fn set_session_status(
    conn: &Connection,
    session_id: i64,
    status: ProcessingStatus,
    error_message: Option<&str>,
) -> Result<()> {
    let rows = conn.execute(
        "UPDATE sessions SET status = ?1, error_message = ?2 WHERE id = ?3",
        params![status.as_str(), error_message, session_id],
    )?;
    if rows == 0 {
        return Err(Error::not_found("session", session_id));
    }
    Ok(())
}

pub fn update_session_summary(conn: &Connection, session_id: i64, summary: &str) -> Result<()> {
    let rows = conn.execute(
        "UPDATE sessions SET summary = ?1 WHERE id = ?2",
        params![summary, session_id],
    )?;
    if rows == 0 {
        return Err(Error::not_found("session", session_id));
    }
    Ok(())
}

/// Delete all analysis rows (highlights, quotes, moments) for a session.
/// Used by the regeneration path before re-ingesting.
pub fn clear_session_analysis(conn: &Connection, session_id: i64) -> Result<()> {
    conn.execute("DELETE FROM highlights WHERE session_id = ?1", params![session_id])?;
    conn.execute("DELETE FROM quotes WHERE session_id = ?1", params![session_id])?;
    conn.execute("DELETE FROM moments WHERE session_id = ?1", params![session_id])?;
    Ok(())
}

// ── Personas ─────────────────────────────────────────────────────────────────

fn persona_from_row(row: &Row) -> rusqlite::Result<Persona> {
    let role: String = row.get(5)?;
    let aliases_raw: Option<String> = row.get(14)?;
    Ok(Persona {
        id: row.get(0)?,
        campaign_id: row.get(1)?,
        session_id: row.get(2)?,
        name: row.get(3)?,
        status: row.get(4)?,
        role: role.parse::<Role>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, e.into())
        })?,
        description: row.get(6)?,
        voice_description: row.get(7)?,
        gender: row.get(8)?,
        race: row.get(9)?,
        class: row.get(10)?,
        level: row.get(11)?,
        alignment: row.get(12)?,
        faction: row.get(13)?,
        aliases: parse_aliases(aliases_raw.as_deref()),
        player_name: row.get(15)?,
        summary: row.get(16)?,
        created_at: row.get(17)?,
    })
}

const PERSONA_COLUMNS: &str = "id, campaign_id, session_id, name, status, role, description, \
     voice_description, gender, race, class, level, alignment, faction, aliases, player_name, \
     summary, created_at";

pub fn get_persona(conn: &Connection, persona_id: i64) -> Result<Persona> {
    conn.query_row(
        &format!("SELECT {PERSONA_COLUMNS} FROM personas WHERE id = ?1"),
        params![persona_id],
        persona_from_row,
    )
    .optional()?
    .ok_or(Error::not_found("persona", persona_id))
}

/// Load a campaign's full persona roster in insertion order. Resolution is
/// order dependent, so the ordering here is part of the contract.
pub fn load_roster(conn: &Connection, campaign_id: i64) -> Result<Vec<Persona>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PERSONA_COLUMNS} FROM personas WHERE campaign_id = ?1 ORDER BY id"
    ))?;
    let rows = stmt
        .query_map(params![campaign_id], persona_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Case-insensitive exact name lookup, first match by insertion order.
pub fn find_persona_by_name(
    conn: &Connection,
    campaign_id: i64,
    name: &str,
) -> Result<Option<Persona>> {
    let persona = conn
        .query_row(
            &format!(
                "SELECT {PERSONA_COLUMNS} FROM personas \
                 WHERE campaign_id = ?1 AND name = ?2 COLLATE NOCASE ORDER BY id LIMIT 1"
            ),
            params![campaign_id, name],
            persona_from_row,
        )
        .optional()?;
    Ok(persona)
}

pub fn insert_persona(
    conn: &Connection,
    campaign_id: i64,
    session_id: Option<i64>,
    new: &NewPersona,
) -> Result<i64> {
    let aliases_json = serde_json::to_string(&new.aliases)?;
    conn.execute(
        "INSERT INTO personas (campaign_id, session_id, name, role, description, \
         voice_description, gender, race, class, level, alignment, status, faction, aliases, \
         player_name, summary, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            campaign_id,
            session_id,
            new.name,
            new.role.unwrap_or(Role::Npc).as_str(),
            new.description,
            new.voice_description,
            new.gender,
            new.race,
            new.class,
            new.level,
            new.alignment,
            new.status.as_deref().unwrap_or("Alive"),
            new.faction,
            aliases_json,
            new.player_name,
            new.summary,
            now(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Write back every mutable persona field. `id` and `campaign_id` never change.
pub fn update_persona(conn: &Connection, persona: &Persona) -> Result<()> {
    let aliases_json = serde_json::to_string(&persona.aliases)?;
    let rows = conn.execute(
        "UPDATE personas SET name = ?1, role = ?2, description = ?3, voice_description = ?4, \
         gender = ?5, race = ?6, class = ?7, level = ?8, alignment = ?9, status = ?10, \
         faction = ?11, aliases = ?12, player_name = ?13, summary = ?14 WHERE id = ?15",
        params![
            persona.name,
            persona.role.as_str(),
            persona.description,
            persona.voice_description,
            persona.gender,
            persona.race,
            persona.class,
            persona.level,
            persona.alignment,
            persona.status,
            persona.faction,
            aliases_json,
            persona.player_name,
            persona.summary,
            persona.id,
        ],
    )?;
    if rows == 0 {
        return Err(Error::not_found("persona", persona.id));
    }
    Ok(())
}

// ── Highlights / quotes / moments ────────────────────────────────────────────

/// Insert a highlight unless an identical text already exists for the session.
/// Returns `true` when a row was inserted.
pub fn insert_highlight_if_new(
    conn: &Connection,
    session_id: i64,
    campaign_id: i64,
    persona_id: Option<i64>,
    name: Option<&str>,
    kind: HighlightKind,
    text: &str,
) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM highlights WHERE session_id = ?1 AND text = ?2",
        params![session_id, text],
        |row| row.get(0),
    )?;
    if exists {
        tracing::debug!(session_id, "duplicate highlight skipped");
        return Ok(false);
    }
    conn.execute(
        "INSERT INTO highlights (text, name, kind, session_id, persona_id, campaign_id, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![text, name, kind.as_str(), session_id, persona_id, campaign_id, now()],
    )?;
    Ok(true)
}

pub fn insert_quote_if_new(
    conn: &Connection,
    session_id: i64,
    campaign_id: i64,
    persona_id: Option<i64>,
    speaker_name: Option<&str>,
    text: &str,
) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM quotes WHERE session_id = ?1 AND text = ?2",
        params![session_id, text],
        |row| row.get(0),
    )?;
    if exists {
        tracing::debug!(session_id, "duplicate quote skipped");
        return Ok(false);
    }
    conn.execute(
        "INSERT INTO quotes (text, speaker_name, session_id, persona_id, campaign_id, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![text, speaker_name, session_id, persona_id, campaign_id, now()],
    )?;
    Ok(true)
}

/// Moments dedup by title rather than full text.
pub fn insert_moment_if_new(
    conn: &Connection,
    session_id: i64,
    title: &str,
    description: &str,
) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM moments WHERE session_id = ?1 AND title = ?2",
        params![session_id, title],
        |row| row.get(0),
    )?;
    if exists {
        tracing::debug!(session_id, "duplicate moment skipped");
        return Ok(false);
    }
    conn.execute(
        "INSERT INTO moments (session_id, title, description, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![session_id, title, description, now()],
    )?;
    Ok(true)
}

pub fn list_highlights_for_session(conn: &Connection, session_id: i64) -> Result<Vec<Highlight>> {
    let mut stmt = conn.prepare(
        "SELECT id, text, name, kind, session_id, persona_id, campaign_id, created_at \
         FROM highlights WHERE session_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![session_id], highlight_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_highlights_for_persona(conn: &Connection, persona_id: i64) -> Result<Vec<Highlight>> {
    let mut stmt = conn.prepare(
        "SELECT id, text, name, kind, session_id, persona_id, campaign_id, created_at \
         FROM highlights WHERE persona_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![persona_id], highlight_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn highlight_from_row(row: &Row) -> rusqlite::Result<Highlight> {
    let kind: String = row.get(3)?;
    Ok(Highlight {
        id: row.get(0)?,
        text: row.get(1)?,
        name: row.get(2)?,
        kind: if kind == "low" { HighlightKind::Low } else { HighlightKind::High },
        session_id: row.get(4)?,
        persona_id: row.get(5)?,
        campaign_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn list_quotes_for_session(conn: &Connection, session_id: i64) -> Result<Vec<Quote>> {
    let mut stmt = conn.prepare(
        "SELECT id, text, speaker_name, session_id, persona_id, campaign_id, created_at \
         FROM quotes WHERE session_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![session_id], quote_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_quotes_for_persona(conn: &Connection, persona_id: i64) -> Result<Vec<Quote>> {
    let mut stmt = conn.prepare(
        "SELECT id, text, speaker_name, session_id, persona_id, campaign_id, created_at \
         FROM quotes WHERE persona_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![persona_id], quote_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn quote_from_row(row: &Row) -> rusqlite::Result<Quote> {
    Ok(Quote {
        id: row.get(0)?,
        text: row.get(1)?,
        speaker_name: row.get(2)?,
        session_id: row.get(3)?,
        persona_id: row.get(4)?,
        campaign_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub fn list_moments_for_session(conn: &Connection, session_id: i64) -> Result<Vec<Moment>> {
    let mut stmt = conn.prepare(
        "SELECT id, session_id, title, description, kind, created_at \
         FROM moments WHERE session_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![session_id], |row| {
            Ok(Moment {
                id: row.get(0)?,
                session_id: row.get(1)?,
                title: row.get(2)?,
                description: row.get(3)?,
                kind: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ────────────────────────────────────────────────────────────────────

/// Row counts per table for one campaign, for the `stats` command.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CampaignStats {
    pub sessions: i64,
    pub personas: i64,
    pub highlights: i64,
    pub quotes: i64,
    pub moments: i64,
    pub chunks: i64,
}

pub fn campaign_stats(conn: &Connection, campaign_id: i64) -> Result<CampaignStats> {
    let count = |sql: &str| -> Result<i64> {
        Ok(conn.query_row(sql, params![campaign_id], |row| row.get(0))?)
    };
    Ok(CampaignStats {
        sessions: count("SELECT COUNT(*) FROM sessions WHERE campaign_id = ?1")?,
        personas: count("SELECT COUNT(*) FROM personas WHERE campaign_id = ?1")?,
        highlights: count("SELECT COUNT(*) FROM highlights WHERE campaign_id = ?1")?,
        quotes: count("SELECT COUNT(*) FROM quotes WHERE campaign_id = ?1")?,
        moments: count(
            "SELECT COUNT(*) FROM moments WHERE session_id IN \
             (SELECT id FROM sessions WHERE campaign_id = ?1)",
        )?,
        chunks: count("SELECT COUNT(*) FROM chunks WHERE campaign_id = ?1")?,
    })
}
