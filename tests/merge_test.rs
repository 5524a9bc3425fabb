mod helpers;

use helpers::{seed_campaign, seed_session, test_db};
use lorekeeper::campaign::merge::merge_personas;
use lorekeeper::campaign::store::{self, NewPersona};
use lorekeeper::campaign::types::HighlightKind;
use lorekeeper::Error;

fn insert(conn: &rusqlite::Connection, campaign_id: i64, new: NewPersona) -> i64 {
    store::insert_persona(conn, campaign_id, None, &new).unwrap()
}

#[test]
fn merge_reassigns_highlights_and_quotes() {
    let mut conn = test_db();
    let campaign_id = seed_campaign(&conn);
    let session_id = seed_session(&conn, campaign_id, "Session 1");

    let target = insert(&conn, campaign_id, NewPersona { name: "Gwendolyn".into(), ..Default::default() });
    let source = insert(&conn, campaign_id, NewPersona { name: "Gwen".into(), ..Default::default() });

    store::insert_highlight_if_new(
        &conn,
        session_id,
        campaign_id,
        Some(source),
        Some("Gwen"),
        HighlightKind::High,
        "Gwen picked the lock on the crypt door.",
    )
    .unwrap();
    store::insert_quote_if_new(
        &conn,
        session_id,
        campaign_id,
        Some(source),
        Some("Gwen"),
        "Locks are just puzzles with attitude.",
    )
    .unwrap();

    merge_personas(&mut conn, target, source).unwrap();

    assert_eq!(store::list_highlights_for_persona(&conn, target).unwrap().len(), 1);
    assert_eq!(store::list_quotes_for_persona(&conn, target).unwrap().len(), 1);
    assert!(matches!(
        store::get_persona(&conn, source).unwrap_err(),
        Error::NotFound { kind: "persona", .. }
    ));
}

#[test]
fn target_voice_wins_when_present() {
    let mut conn = test_db();
    let campaign_id = seed_campaign(&conn);

    let target = insert(
        &conn,
        campaign_id,
        NewPersona {
            name: "Gwendolyn".into(),
            voice_description: Some("Soft Irish lilt".into()),
            ..Default::default()
        },
    );
    let source = insert(
        &conn,
        campaign_id,
        NewPersona {
            name: "Gwen".into(),
            voice_description: Some("Harsh whisper".into()),
            ..Default::default()
        },
    );

    let merged = merge_personas(&mut conn, target, source).unwrap();
    assert_eq!(merged.voice_description.as_deref(), Some("Soft Irish lilt"));
}

#[test]
fn empty_target_voice_is_filled_from_source() {
    let mut conn = test_db();
    let campaign_id = seed_campaign(&conn);

    let target = insert(&conn, campaign_id, NewPersona { name: "Gwendolyn".into(), ..Default::default() });
    let source = insert(
        &conn,
        campaign_id,
        NewPersona {
            name: "Gwen".into(),
            voice_description: Some("Harsh whisper".into()),
            ..Default::default()
        },
    );

    let merged = merge_personas(&mut conn, target, source).unwrap();
    assert_eq!(merged.voice_description.as_deref(), Some("Harsh whisper"));
}

#[test]
fn source_summary_is_appended_as_a_marked_block() {
    let mut conn = test_db();
    let campaign_id = seed_campaign(&conn);

    let target = insert(
        &conn,
        campaign_id,
        NewPersona {
            name: "Gwendolyn".into(),
            summary: Some("A rogue from Baldur's Gate.".into()),
            ..Default::default()
        },
    );
    let source = insert(
        &conn,
        campaign_id,
        NewPersona {
            name: "Gwen".into(),
            summary: Some("Seen picking pockets at the carnival.".into()),
            ..Default::default()
        },
    );

    let merged = merge_personas(&mut conn, target, source).unwrap();
    assert_eq!(
        merged.summary.as_deref(),
        Some("A rogue from Baldur's Gate.\n[Merged from Gwen] Seen picking pockets at the carnival.")
    );
}

#[test]
fn already_absorbed_summary_is_not_appended_again() {
    let mut conn = test_db();
    let campaign_id = seed_campaign(&conn);

    let absorbed = "A rogue.\n[Merged from Gwen] Seen at the carnival.";
    let target = insert(
        &conn,
        campaign_id,
        NewPersona {
            name: "Gwendolyn".into(),
            summary: Some(absorbed.into()),
            ..Default::default()
        },
    );
    let source = insert(
        &conn,
        campaign_id,
        NewPersona {
            name: "Gwen again".into(),
            summary: Some("Seen at the carnival.".into()),
            ..Default::default()
        },
    );

    let merged = merge_personas(&mut conn, target, source).unwrap();
    assert_eq!(merged.summary.as_deref(), Some(absorbed));
}

#[test]
fn placeholder_source_summary_is_ignored() {
    let mut conn = test_db();
    let campaign_id = seed_campaign(&conn);

    let target = insert(&conn, campaign_id, NewPersona { name: "Gwendolyn".into(), ..Default::default() });
    let source = insert(
        &conn,
        campaign_id,
        NewPersona {
            name: "Gwen".into(),
            summary: Some("None".into()),
            ..Default::default()
        },
    );

    let merged = merge_personas(&mut conn, target, source).unwrap();
    assert!(merged.summary.is_none());
}

#[test]
fn missing_persona_aborts_before_any_mutation() {
    let mut conn = test_db();
    let campaign_id = seed_campaign(&conn);

    let target = insert(&conn, campaign_id, NewPersona { name: "Gwendolyn".into(), ..Default::default() });

    let err = merge_personas(&mut conn, target, 999).unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "persona", id: 999 }));
    // Target untouched.
    assert!(store::get_persona(&conn, target).is_ok());
}
