pub mod config;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod record;
pub mod record_validation;
pub mod scheduler;
pub mod tracker;

pub use config::{StorageBackend, TrackerConfig};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteRecordStore;
pub use persistence::{
    FileRecordStore, LoadReport, MalformedLine, PersistenceError, PersistenceResult,
    RecordParseError, RecordStore, default_data_path, encode_record_line,
    export_status_report_csv, load_records, load_records_from_json, parse_record_line,
    save_records, save_records_to_json,
};
pub use record::MaintenanceRecord;
pub use record_validation::{InputError, parse_interval_days, parse_service_date, validate_name};
pub use scheduler::{
    AlertSummary, Clock, DUE_SOON_WINDOW_DAYS, FixedClock, Scheduler, ServiceForecast,
    ServiceStatus, SystemClock, days_until_next, days_until_next_on, next_service_date, status,
    status_on,
};
pub use tracker::{Tracker, TrackerError, TrackerResult};
