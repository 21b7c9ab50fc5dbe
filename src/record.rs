use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A single tracked maintenance obligation.
///
/// The identifier is fixed at construction. Everything else may be edited by
/// a front-end between load and save; no core routine mutates a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    id: String,
    pub name: String,
    pub last_service_date: NaiveDate,
    /// Days between services. Zero or negative values are carried through
    /// unchanged; the next service date then never moves forward.
    pub interval_days: i32,
}

impl MaintenanceRecord {
    /// Creates a record with a freshly generated identifier.
    pub fn new(name: impl Into<String>, last_service_date: NaiveDate, interval_days: i32) -> Self {
        Self::with_id(
            Uuid::new_v4().to_string(),
            name,
            last_service_date,
            interval_days,
        )
    }

    /// Rebuilds a record whose identifier is already known, e.g. one read
    /// back from storage.
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        last_service_date: NaiveDate,
        interval_days: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            last_service_date,
            interval_days,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for MaintenanceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (id={}) - last: {}, interval: {} days",
            self.name,
            self.id,
            self.last_service_date.format("%Y-%m-%d"),
            self.interval_days
        )
    }
}
