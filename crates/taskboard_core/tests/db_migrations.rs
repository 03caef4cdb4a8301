use rusqlite::Connection;
use taskboard_core::db::migrations::{apply_migrations, latest_version};
use taskboard_core::db::{open_db, open_db_in_memory, DbError};
use taskboard_core::{SqliteStorage, StorageError};

fn user_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn kv_columns(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info('kv_entries') ORDER BY cid;")
        .unwrap();
    let columns = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap();
    columns
}

#[test]
fn fresh_database_gets_kv_entries_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(user_version(&conn), latest_version());
    assert_eq!(kv_columns(&conn), vec!["key", "value", "updated_at"]);

    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES ('family_task_manager_tasks', '[]');",
        [],
    )
    .unwrap();
    let updated_at: i64 = conn
        .query_row(
            "SELECT updated_at FROM kv_entries WHERE key = 'family_task_manager_tasks';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(updated_at > 0);
}

#[test]
fn migrating_an_up_to_date_connection_changes_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO kv_entries (key, value) VALUES ('k', 'v');", [])
        .unwrap();

    apply_migrations(&mut conn).unwrap();

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(user_version(&conn), latest_version());
}

#[test]
fn board_file_keeps_entries_across_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taskboard.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES ('family_task_manager_current_user', '2');",
            [],
        )
        .unwrap();
    }

    let conn = open_db(&path).unwrap();
    let value: String = conn
        .query_row(
            "SELECT value FROM kv_entries WHERE key = 'family_task_manager_current_user';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(value, "2");
}

#[test]
fn board_file_from_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("newer.sqlite3");
    let future = latest_version() + 1;
    Connection::open(&path)
        .unwrap()
        .execute_batch(&format!("PRAGMA user_version = {future};"))
        .unwrap();

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, future);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = SqliteStorage::open(&path, None).unwrap_err();
    assert!(err.to_string().contains(&format!("schema v{future}")));
    assert!(matches!(
        err,
        StorageError::Db(DbError::UnsupportedSchemaVersion { .. })
    ));
}
