use flowbit_core::db::migrations::{apply_migrations, latest_version};
use flowbit_core::db::{open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn fresh_connection_is_migrated_to_latest() {
    let conn = open_db_in_memory().unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn migrations_are_idempotent() {
    let mut conn = open_db_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();
    apply_migrations(&mut conn).unwrap();
}

#[test]
fn newer_schema_versions_are_rejected() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
        .unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    assert!(matches!(err, DbError::UnsupportedSchemaVersion { .. }));
}

#[test]
fn panel_state_table_accepts_blob_rows() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO panel_state (key, value) VALUES ('probe', '[]');",
        [],
    )
    .unwrap();

    let value: String = conn
        .query_row(
            "SELECT value FROM panel_state WHERE key = 'probe';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(value, "[]");
}
