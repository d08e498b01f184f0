use chrono::{TimeZone, Utc};
use rusqlite::Connection;
use taskboard_core::db::migrations::latest_version;
use taskboard_core::db::{open_db, open_db_in_memory, DbError};
use taskboard_core::{
    Category, DateTimeRange, KeyValueStorage, ManualClock, NewTask, PersistenceErrorKind,
    Priority, SqliteKeyValueStorage, StoreError, TaskStore, TASKS_STORAGE_KEY,
};

fn new_task(name: &str) -> NewTask {
    let at = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
    NewTask {
        name: name.to_string(),
        description: "stored on disk".to_string(),
        priority: Priority::High,
        category: Category::NotUrgentNotImportant,
        date_time_range: DateTimeRange::new(at, at),
    }
}

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
    assert!(SqliteKeyValueStorage::try_new(&conn).is_ok());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::StorageSchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn tasks_survive_reopening_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.db");
    let clock = ManualClock::new(1_000);

    {
        let conn = open_db(&path).unwrap();
        let storage = SqliteKeyValueStorage::try_new(&conn).unwrap();
        let mut store = TaskStore::initialize(storage, &clock).unwrap();
        store.add(new_task("first")).unwrap();
        clock.advance(1);
        store.add(new_task("second")).unwrap();
        store.toggle_complete(1_000).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let storage = SqliteKeyValueStorage::try_new(&conn).unwrap();
    let store = TaskStore::initialize(storage, &clock).unwrap();

    let names: Vec<_> = store.tasks().iter().map(|task| task.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);
    assert!(store.get(1_000).unwrap().completed);
    assert!(!store.get(1_001).unwrap().completed);
}

#[test]
fn stored_blob_is_a_json_array_under_tasks_key() {
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteKeyValueStorage::try_new(&conn).unwrap();
    let mut store = TaskStore::initialize(storage, ManualClock::new(5)).unwrap();
    store.add(new_task("blob")).unwrap();

    let raw = store
        .repository()
        .storage()
        .get_item(TASKS_STORAGE_KEY)
        .unwrap()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], 5);
    assert_eq!(items[0]["name"], "blob");
    assert_eq!(items[0]["category"], "Not Urgent and Not Important");
    assert_eq!(items[0]["dateTimeRange"][0], "2024-02-29T12:00:00Z");
}

#[test]
fn malformed_row_fails_initialization() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_store (key, value) VALUES (?1, ?2);",
        [TASKS_STORAGE_KEY, "not-json"],
    )
    .unwrap();
    let storage = SqliteKeyValueStorage::try_new(&conn).unwrap();

    match TaskStore::initialize(storage, ManualClock::new(0)) {
        Err(StoreError::Persistence(err)) => {
            assert_eq!(err.kind(), PersistenceErrorKind::Malformed)
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("malformed data must not load"),
    }
}
