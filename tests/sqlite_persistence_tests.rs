#![cfg(feature = "sqlite")]

use chrono::NaiveDate;
use maintenance_tracker::{
    FixedClock, MaintenanceRecord, RecordParseError, RecordStore, SqliteRecordStore, Tracker,
};
use rusqlite::Connection;
use tempfile::tempdir;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn sqlite_store_round_trips_records_in_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.db");
    let records = vec![
        MaintenanceRecord::with_id("b", "Second, alphabetically first", d(2024, 1, 1), 90),
        MaintenanceRecord::with_id("a", "Multi\nline", d(2023, 6, 30), -1),
    ];

    {
        let store = SqliteRecordStore::new(&path).unwrap();
        store.save(&records).unwrap();
    }

    let store = SqliteRecordStore::new(&path).unwrap();
    assert_eq!(store.load().unwrap(), records);
}

#[test]
fn sqlite_save_replaces_previous_snapshot() {
    let store = SqliteRecordStore::in_memory().unwrap();
    store
        .save(&[
            MaintenanceRecord::with_id("1", "A", d(2024, 1, 1), 1),
            MaintenanceRecord::with_id("2", "B", d(2024, 1, 1), 2),
        ])
        .unwrap();
    let replacement = vec![MaintenanceRecord::with_id("3", "C", d(2024, 2, 2), 3)];
    store.save(&replacement).unwrap();

    assert_eq!(store.load().unwrap(), replacement);
}

#[test]
fn sqlite_rows_with_bad_dates_are_skipped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.db");
    let store = SqliteRecordStore::new(&path).unwrap();
    store
        .save(&[
            MaintenanceRecord::with_id("1", "Good", d(2024, 1, 1), 30),
            MaintenanceRecord::with_id("2", "Soon bad", d(2024, 1, 1), 30),
        ])
        .unwrap();

    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "UPDATE maintenance_records SET last_service_date = 'someday' WHERE id = '2'",
        [],
    )
    .unwrap();
    drop(conn);

    let report = store.load_with_report().unwrap();
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].id(), "1");
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(
        report.skipped[0].reason,
        RecordParseError::InvalidDate("someday".into())
    );
}

#[test]
fn sqlite_rows_with_mistyped_columns_are_skipped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.db");
    let store = SqliteRecordStore::new(&path).unwrap();
    store
        .save(&[
            MaintenanceRecord::with_id("a", "Good", d(2024, 1, 1), 30),
            MaintenanceRecord::with_id("b", "Bad interval", d(2024, 1, 1), 30),
            MaintenanceRecord::with_id("c", "Bad name", d(2024, 1, 1), 30),
            MaintenanceRecord::with_id("d", "Far", d(10000, 1, 1), 30),
        ])
        .unwrap();

    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "UPDATE maintenance_records SET interval_days = 'often' WHERE id = 'b'",
        [],
    )
    .unwrap();
    conn.execute(
        "UPDATE maintenance_records SET name = X'FF00' WHERE id = 'c'",
        [],
    )
    .unwrap();
    drop(conn);

    let report = store.load_with_report().unwrap();
    let ids: Vec<&str> = report.records.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["a", "d"]);
    assert_eq!(report.records[1].last_service_date, d(10000, 1, 1));
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].line_number, 2);
    assert_eq!(
        report.skipped[0].reason,
        RecordParseError::InvalidInterval("often".into())
    );
    assert_eq!(report.skipped[1].line_number, 3);
    assert_eq!(
        report.skipped[1].reason,
        RecordParseError::FieldCount { found: 3 }
    );
}

#[test]
fn tracker_works_over_sqlite_backend() {
    let store = SqliteRecordStore::in_memory().unwrap();
    let (mut tracker, _) = Tracker::open(store, FixedClock(d(2024, 3, 25))).unwrap();
    tracker.add("Oil Change", d(2024, 1, 1), 90);
    tracker.save().unwrap();
    tracker.add("Unsaved", d(2024, 1, 1), 10);

    tracker.reload().unwrap();

    assert_eq!(tracker.len(), 1);
    assert_eq!(tracker.forecasts()[0].days_until_next, 6);
}
