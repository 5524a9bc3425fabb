//! SQL DDL for all lorekeeper tables.
//!
//! Defines the `campaigns`, `sessions`, `personas`, `highlights`, `quotes`,
//! `moments`, and `chunks` tables plus `schema_meta`. All DDL uses
//! `IF NOT EXISTS` for idempotent initialization.
//!
//! References are one-directional: child rows hold integer foreign keys and
//! lookups go through queries. `chunks` is a derived projection and carries no
//! foreign key to its source entity; it is rebuilt wholesale by a reindex.

use rusqlite::Connection;

/// All schema DDL statements for lorekeeper's tables.
const SCHEMA_SQL: &str = r#"
-- Primary records
CREATE TABLE IF NOT EXISTS campaigns (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    summary TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    campaign_id INTEGER NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    summary TEXT,
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK(status IN ('pending','uploaded','resolving','persisting','indexing','completed','error')),
    error_message TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_campaign ON sessions(campaign_id);

CREATE TABLE IF NOT EXISTS personas (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    campaign_id INTEGER NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
    session_id INTEGER REFERENCES sessions(id) ON DELETE SET NULL,
    name TEXT NOT NULL,
    role TEXT NOT NULL CHECK(role IN ('PC','NPC','DM','Monster')),
    description TEXT,
    voice_description TEXT,
    gender TEXT,
    race TEXT,
    class TEXT,
    level INTEGER,
    alignment TEXT,
    status TEXT NOT NULL DEFAULT 'Alive',
    faction TEXT,
    aliases TEXT NOT NULL DEFAULT '[]',
    player_name TEXT,
    summary TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_personas_campaign ON personas(campaign_id);

-- Highlights and low points share one table, split by kind
CREATE TABLE IF NOT EXISTS highlights (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    name TEXT,
    kind TEXT NOT NULL DEFAULT 'high' CHECK(kind IN ('high','low')),
    session_id INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    persona_id INTEGER REFERENCES personas(id) ON DELETE CASCADE,
    campaign_id INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_highlights_session ON highlights(session_id);
CREATE INDEX IF NOT EXISTS idx_highlights_persona ON highlights(persona_id);

CREATE TABLE IF NOT EXISTS quotes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    speaker_name TEXT,
    session_id INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    persona_id INTEGER REFERENCES personas(id) ON DELETE CASCADE,
    campaign_id INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_quotes_session ON quotes(session_id);
CREATE INDEX IF NOT EXISTS idx_quotes_persona ON quotes(persona_id);

CREATE TABLE IF NOT EXISTS moments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    kind TEXT NOT NULL DEFAULT 'highlight',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_moments_session ON moments(session_id);

-- Derived retrieval projection. No FK to the source entity: chunks are
-- rebuildable from primary records and may briefly outlive them.
CREATE TABLE IF NOT EXISTS chunks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    campaign_id INTEGER NOT NULL,
    source_type TEXT NOT NULL
        CHECK(source_type IN ('persona','session_summary','highlight','quote','moment')),
    source_id INTEGER NOT NULL,
    text_content TEXT NOT NULL,
    embedding TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chunks_campaign ON chunks(campaign_id);
CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(campaign_id, source_type, source_id);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        for table in [
            "campaigns",
            "sessions",
            "personas",
            "highlights",
            "quotes",
            "moments",
            "chunks",
            "schema_meta",
        ] {
            assert!(tables.contains(&table.to_string()), "missing table {table}");
        }
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap(); // second call should not error
    }

    #[test]
    fn persona_role_is_checked() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO campaigns (name, created_at) VALUES ('c', '2026-01-01')",
            [],
        )
        .unwrap();

        let err = conn.execute(
            "INSERT INTO personas (campaign_id, name, role, created_at) VALUES (1, 'X', 'Villager', '2026-01-01')",
            [],
        );
        assert!(err.is_err());
    }
}
