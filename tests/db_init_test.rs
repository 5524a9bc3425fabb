mod helpers;

use lorekeeper::db::open_database;

#[test]
fn open_database_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("campaigns.db");

    let conn = open_database(&path).unwrap();

    assert!(path.exists());
    // Schema is applied on open.
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM campaigns", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn reopening_an_existing_database_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("campaigns.db");

    {
        let conn = open_database(&path).unwrap();
        lorekeeper::campaign::store::create_campaign(&conn, "Test Campaign", None).unwrap();
    }

    let conn = open_database(&path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM campaigns", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn foreign_keys_are_enforced() {
    let conn = helpers::test_db();

    let result = conn.execute(
        "INSERT INTO sessions (campaign_id, name, status, created_at) \
         VALUES (999, 'orphan', 'pending', '2026-01-01T00:00:00Z')",
        [],
    );
    assert!(result.is_err());
}
