mod helpers;

use helpers::{seed_campaign, seed_persona, seed_session, test_db, FakeEmbedder};
use lorekeeper::campaign::analysis::SessionAnalysis;
use lorekeeper::campaign::chunks;
use lorekeeper::campaign::ingest::run_ingestion;
use lorekeeper::campaign::store;
use lorekeeper::campaign::types::ProcessingStatus;
use serde_json::json;

fn analysis(payload: serde_json::Value) -> SessionAnalysis {
    serde_json::from_value(payload).unwrap()
}

fn grog_session() -> SessionAnalysis {
    analysis(json!({
        "summary": "Grog challenged the pit fighter and won by a single hit point.",
        "highlights": ["The party secured passage across the lake."],
        "low_points": ["The healer's kit was stolen."],
        "memorable_quotes": [
            {"speaker": "Grog", "quote": "I would like to rage."},
            "Someone shouted from the crowd."
        ],
        "personas": [{
            "name": "Grog",
            "role": "PC",
            "race": "Goliath",
            "class": "Barbarian",
            "highlights": ["Won the pit fight."]
        }],
        "moments": [{
            "title": "The pit fight",
            "description": "Grog and the champion traded blows for three rounds."
        }]
    }))
}

#[test]
fn ingestion_creates_persona_and_indexes_chunks() {
    let conn = test_db();
    let embedder = FakeEmbedder::new();
    let campaign_id = seed_campaign(&conn);
    let session_id = seed_session(&conn, campaign_id, "Session 3");

    let report = run_ingestion(&conn, &embedder, session_id, &grog_session()).unwrap();

    assert_eq!(report.personas_created, 1);
    assert_eq!(report.personas_matched, 0);
    // persona highlight + session highlight + session low point
    assert_eq!(report.highlights_added, 3);
    assert_eq!(report.quotes_added, 2);
    assert_eq!(report.moments_added, 1);
    // session summary + persona
    assert_eq!(report.chunks_saved, 2);
    assert_eq!(chunks::chunk_count(&conn, campaign_id).unwrap(), 2);

    let grog = store::find_persona_by_name(&conn, campaign_id, "Grog").unwrap().unwrap();
    assert_eq!(grog.class.as_deref(), Some("Barbarian"));

    let persona_chunk: String = conn
        .query_row(
            "SELECT text_content FROM chunks WHERE source_type = 'persona' AND source_id = ?1",
            [grog.id],
            |row| row.get(0),
        )
        .unwrap();
    assert!(persona_chunk.contains("Grog"));
    assert!(persona_chunk.contains("Barbarian"));

    let session = store::get_session(&conn, session_id).unwrap();
    assert_eq!(session.status, ProcessingStatus::Completed);
    assert_eq!(
        session.summary.as_deref(),
        Some("Grog challenged the pit fighter and won by a single hit point.")
    );
}

#[test]
fn reingestion_is_idempotent() {
    let conn = test_db();
    let embedder = FakeEmbedder::new();
    let campaign_id = seed_campaign(&conn);
    let session_id = seed_session(&conn, campaign_id, "Session 3");

    run_ingestion(&conn, &embedder, session_id, &grog_session()).unwrap();
    let report = run_ingestion(&conn, &embedder, session_id, &grog_session()).unwrap();

    assert_eq!(report.personas_created, 0);
    assert_eq!(report.personas_matched, 1);
    assert_eq!(report.highlights_added, 0);
    assert_eq!(report.quotes_added, 0);
    assert_eq!(report.moments_added, 0);
    assert_eq!(report.chunks_saved, 0);
    assert_eq!(chunks::chunk_count(&conn, campaign_id).unwrap(), 2);
}

#[test]
fn variant_name_resolves_to_existing_persona() {
    let conn = test_db();
    let embedder = FakeEmbedder::new();
    let campaign_id = seed_campaign(&conn);
    let session_id = seed_session(&conn, campaign_id, "Session 4");
    seed_persona(&conn, campaign_id, "Grog Strongjaw");

    let payload = analysis(json!({
        "summary": "A quiet session of downtime and shopping in town.",
        "personas": [{"name": "Grog", "status": "Injured"}]
    }));
    let report = run_ingestion(&conn, &embedder, session_id, &payload).unwrap();

    assert_eq!(report.personas_created, 0);
    assert_eq!(report.personas_matched, 1);

    let grog = store::find_persona_by_name(&conn, campaign_id, "Grog Strongjaw").unwrap().unwrap();
    assert_eq!(grog.status, "Injured");
}

#[test]
fn quote_speaker_links_by_exact_name_only() {
    let conn = test_db();
    let embedder = FakeEmbedder::new();
    let campaign_id = seed_campaign(&conn);
    let session_id = seed_session(&conn, campaign_id, "Session 5");

    let payload = analysis(json!({
        "summary": "The innkeeper shared rumors about the old mill.",
        "personas": [{"name": "Brom"}],
        "memorable_quotes": [
            {"speaker": "brom", "quote": "Stay away from the mill after dark."},
            {"speaker": "Old Man Henrik", "quote": "Mark my words."}
        ]
    }));
    run_ingestion(&conn, &embedder, session_id, &payload).unwrap();

    let brom = store::find_persona_by_name(&conn, campaign_id, "Brom").unwrap().unwrap();
    let quotes = store::list_quotes_for_session(&conn, session_id).unwrap();
    assert_eq!(quotes.len(), 2);

    let linked = quotes.iter().find(|q| q.speaker_name.as_deref() == Some("brom")).unwrap();
    assert_eq!(linked.persona_id, Some(brom.id));

    let unlinked =
        quotes.iter().find(|q| q.speaker_name.as_deref() == Some("Old Man Henrik")).unwrap();
    assert_eq!(unlinked.persona_id, None);
}

#[test]
fn failure_stamps_session_error_and_keeps_partial_writes() {
    let conn = test_db();
    let embedder = FakeEmbedder::failing();
    let campaign_id = seed_campaign(&conn);
    let session_id = seed_session(&conn, campaign_id, "Session 6");

    let err = run_ingestion(&conn, &embedder, session_id, &grog_session()).unwrap_err();
    assert!(err.is_provider());

    let session = store::get_session(&conn, session_id).unwrap();
    assert_eq!(session.status, ProcessingStatus::Error);
    assert!(session.error_message.unwrap().contains("offline"));

    // Rows written before the indexing failure remain.
    assert!(store::find_persona_by_name(&conn, campaign_id, "Grog").unwrap().is_some());
    let report = {
        embedder.set_failing(false);
        run_ingestion(&conn, &embedder, session_id, &grog_session()).unwrap()
    };
    assert_eq!(report.personas_created, 0);
    assert_eq!(report.personas_matched, 1);
    assert_eq!(
        store::get_session(&conn, session_id).unwrap().status,
        ProcessingStatus::Completed
    );
}

#[test]
fn missing_session_is_an_error() {
    let conn = test_db();
    let embedder = FakeEmbedder::new();

    let err = run_ingestion(&conn, &embedder, 42, &grog_session()).unwrap_err();
    assert!(matches!(err, lorekeeper::Error::NotFound { kind: "session", id: 42 }));
}
