use crate::MaintenanceRecord;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single stored line could not be turned back into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordParseError {
    #[error("expected 4 comma-separated fields, found {found}")]
    FieldCount { found: usize },
    #[error("invalid date '{0}'")]
    InvalidDate(String),
    #[error("invalid interval '{0}'")]
    InvalidInterval(String),
    #[error("line is not valid UTF-8")]
    InvalidEncoding,
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// A stored line that was skipped during load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based position in the source.
    pub line_number: usize,
    pub content: String,
    pub reason: RecordParseError,
}

/// Everything a load produced: the records that parsed, plus what was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub records: Vec<MaintenanceRecord>,
    pub skipped: Vec<MalformedLine>,
}

pub trait RecordStore {
    /// Loads the collection, skipping entries that cannot be parsed.
    fn load_with_report(&self) -> PersistenceResult<LoadReport>;

    /// Replaces the stored collection with `records`.
    fn save(&self, records: &[MaintenanceRecord]) -> PersistenceResult<()>;

    fn load(&self) -> PersistenceResult<Vec<MaintenanceRecord>> {
        Ok(self.load_with_report()?.records)
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn load_with_report(&self) -> PersistenceResult<LoadReport> {
        (**self).load_with_report()
    }

    fn save(&self, records: &[MaintenanceRecord]) -> PersistenceResult<()> {
        (**self).save(records)
    }
}

/// `data/items.csv`, relative to the working directory.
pub fn default_data_path() -> PathBuf {
    PathBuf::from("data").join("items.csv")
}

pub mod codec;
pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use codec::{encode_record_line, parse_record_line};
pub use file::{
    FileRecordStore, export_status_report_csv, load_records, load_records_from_json,
    save_records, save_records_to_json,
};
