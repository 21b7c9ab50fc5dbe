use crate::persistence::{MalformedLine, PersistenceError, RecordStore};
use crate::scheduler::{AlertSummary, Clock, Scheduler, ServiceForecast, SystemClock};
use crate::MaintenanceRecord;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("no record with id '{0}'")]
    NotFound(String),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// One editing session over the stored collection.
///
/// The tracker owns the in-memory records between [`Tracker::open`] and
/// [`Tracker::save`]. Front-ends go through it rather than touching the
/// store or the scheduler directly.
pub struct Tracker<S, C = SystemClock> {
    store: S,
    scheduler: Scheduler<C>,
    records: Vec<MaintenanceRecord>,
}

impl<S: RecordStore, C: Clock> Tracker<S, C> {
    /// Loads the collection from `store`. Malformed entries are skipped and
    /// available from the returned list.
    pub fn open(store: S, clock: C) -> TrackerResult<(Self, Vec<MalformedLine>)> {
        let report = store.load_with_report()?;
        if !report.skipped.is_empty() {
            warn!(skipped = report.skipped.len(), "some stored records could not be read");
        }
        info!(records = report.records.len(), "maintenance session opened");
        let tracker = Self {
            store,
            scheduler: Scheduler::new(clock),
            records: report.records,
        };
        Ok((tracker, report.skipped))
    }

    /// Starts a session with the given records without reading the store.
    pub fn with_records(store: S, clock: C, records: Vec<MaintenanceRecord>) -> Self {
        Self {
            store,
            scheduler: Scheduler::new(clock),
            records,
        }
    }

    pub fn records(&self) -> &[MaintenanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn scheduler(&self) -> &Scheduler<C> {
        &self.scheduler
    }

    pub fn today(&self) -> NaiveDate {
        self.scheduler.today()
    }

    pub fn get(&self, id: &str) -> Option<&MaintenanceRecord> {
        self.records.iter().find(|record| record.id() == id)
    }

    fn get_mut(&mut self, id: &str) -> TrackerResult<&mut MaintenanceRecord> {
        self.records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))
    }

    pub fn add(
        &mut self,
        name: impl Into<String>,
        last_service_date: NaiveDate,
        interval_days: i32,
    ) -> &MaintenanceRecord {
        self.insert(MaintenanceRecord::new(name, last_service_date, interval_days))
    }

    pub fn insert(&mut self, record: MaintenanceRecord) -> &MaintenanceRecord {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn rename(&mut self, id: &str, name: impl Into<String>) -> TrackerResult<&MaintenanceRecord> {
        let record = self.get_mut(id)?;
        record.name = name.into();
        Ok(record)
    }

    pub fn set_interval(&mut self, id: &str, interval_days: i32) -> TrackerResult<&MaintenanceRecord> {
        let record = self.get_mut(id)?;
        record.interval_days = interval_days;
        Ok(record)
    }

    /// Marks the record as serviced on `date`.
    pub fn record_service(&mut self, id: &str, date: NaiveDate) -> TrackerResult<&MaintenanceRecord> {
        let record = self.get_mut(id)?;
        record.last_service_date = date;
        Ok(record)
    }

    pub fn remove(&mut self, id: &str) -> TrackerResult<MaintenanceRecord> {
        let idx = self
            .records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))?;
        Ok(self.records.remove(idx))
    }

    pub fn forecast(&self, id: &str) -> Option<ServiceForecast> {
        self.get(id).map(|record| self.scheduler.forecast(record))
    }

    pub fn forecasts(&self) -> Vec<ServiceForecast> {
        self.scheduler.forecasts(&self.records)
    }

    pub fn alerts(&self) -> AlertSummary {
        self.scheduler.alerts(&self.records)
    }

    pub fn save(&self) -> TrackerResult<()> {
        self.store.save(&self.records)?;
        info!(records = self.records.len(), "maintenance records saved");
        Ok(())
    }

    /// Drops unsaved changes and reads the store again.
    pub fn reload(&mut self) -> TrackerResult<Vec<MalformedLine>> {
        let report = self.store.load_with_report()?;
        self.records = report.records;
        Ok(report.skipped)
    }
}
