use super::codec::parse_date;
use super::{LoadReport, MalformedLine, PersistenceResult, RecordParseError, RecordStore};
use crate::MaintenanceRecord;
use rusqlite::types::Value;
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Keeps the collection in a single SQLite table, ordered by position.
pub struct SqliteRecordStore {
    connection: Mutex<Connection>,
}

impl SqliteRecordStore {
    pub fn new<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS maintenance_records (
                position INTEGER PRIMARY KEY,
                id TEXT NOT NULL,
                name TEXT NOT NULL,
                last_service_date TEXT NOT NULL,
                interval_days INTEGER NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.connection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RecordStore for SqliteRecordStore {
    fn load_with_report(&self) -> PersistenceResult<LoadReport> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT position, id, name, last_service_date, interval_days
             FROM maintenance_records ORDER BY position ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                [
                    row.get::<_, Value>(1)?,
                    row.get::<_, Value>(2)?,
                    row.get::<_, Value>(3)?,
                    row.get::<_, Value>(4)?,
                ],
            ))
        })?;

        let mut report = LoadReport::default();
        for row in rows {
            let (position, columns) = row?;
            match record_from_columns(&columns) {
                Ok(record) => report.records.push(record),
                Err(reason) => {
                    warn!(position, error = %reason, "skipping malformed row");
                    report.skipped.push(MalformedLine {
                        line_number: usize::try_from(position).unwrap_or_default(),
                        content: columns.iter().map(column_text).collect::<Vec<_>>().join(","),
                        reason,
                    });
                }
            }
        }
        debug!(
            loaded = report.records.len(),
            skipped = report.skipped.len(),
            "loaded maintenance records from sqlite"
        );
        Ok(report)
    }

    fn save(&self, records: &[MaintenanceRecord]) -> PersistenceResult<()> {
        let mut conn = self.connection();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM maintenance_records", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO maintenance_records
                 (position, id, name, last_service_date, interval_days)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (position, record) in records.iter().enumerate() {
                stmt.execute(params![
                    position as i64 + 1,
                    record.id(),
                    record.name,
                    record.last_service_date.format("%Y-%m-%d").to_string(),
                    record.interval_days,
                ])?;
            }
        }
        tx.commit()?;
        debug!(saved = records.len(), "saved maintenance records to sqlite");
        Ok(())
    }
}

/// Builds a record from the `id, name, last_service_date, interval_days`
/// columns, whatever storage class SQLite handed back for each.
fn record_from_columns(columns: &[Value; 4]) -> Result<MaintenanceRecord, RecordParseError> {
    let [id, name, date, interval] = columns;
    let (Some(id), Some(name), Some(date)) = (text_of(id), text_of(name), text_of(date)) else {
        return Err(RecordParseError::FieldCount {
            found: columns.iter().filter(|value| text_of(value).is_some()).count(),
        });
    };
    let date = parse_date(&date)?;
    let interval = match interval {
        Value::Integer(days) => i32::try_from(*days).ok(),
        Value::Text(days) => days.trim().parse::<i32>().ok(),
        _ => None,
    }
    .ok_or_else(|| RecordParseError::InvalidInterval(column_text(interval)))?;
    Ok(MaintenanceRecord::with_id(id, name, date, interval))
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Text(text) => Some(text.clone()),
        Value::Integer(number) => Some(number.to_string()),
        Value::Real(number) => Some(number.to_string()),
        Value::Null | Value::Blob(_) => None,
    }
}

fn column_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        other => text_of(other).unwrap_or_default(),
    }
}
