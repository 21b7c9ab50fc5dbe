use crate::MaintenanceRecord;
use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive lookahead, in days, for [`ServiceStatus::DueSoon`].
pub const DUE_SOON_WINDOW_DAYS: i64 = 7;

/// Source of "today" for status computations.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Reads the local calendar date on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    Overdue,
    DueSoon,
    Ok,
}

impl ServiceStatus {
    /// Classifies a day count. Negative means the next service date has passed.
    pub fn from_days_until(days: i64) -> Self {
        if days < 0 {
            ServiceStatus::Overdue
        } else if days <= DUE_SOON_WINDOW_DAYS {
            ServiceStatus::DueSoon
        } else {
            ServiceStatus::Ok
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Overdue => "OVERDUE",
            ServiceStatus::DueSoon => "DUE_SOON",
            ServiceStatus::Ok => "OK",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `last_service_date + interval_days`, clamped to the representable date
/// range.
pub fn next_service_date(record: &MaintenanceRecord) -> NaiveDate {
    let interval = Duration::days(i64::from(record.interval_days));
    record
        .last_service_date
        .checked_add_signed(interval)
        .unwrap_or(if record.interval_days < 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        })
}

/// Whole days from `today` until the record's next service date.
pub fn days_until_next_on(record: &MaintenanceRecord, today: NaiveDate) -> i64 {
    (next_service_date(record) - today).num_days()
}

pub fn status_on(record: &MaintenanceRecord, today: NaiveDate) -> ServiceStatus {
    ServiceStatus::from_days_until(days_until_next_on(record, today))
}

pub fn days_until_next(record: &MaintenanceRecord) -> i64 {
    days_until_next_on(record, SystemClock.today())
}

pub fn status(record: &MaintenanceRecord) -> ServiceStatus {
    status_on(record, SystemClock.today())
}

/// A record evaluated against a particular day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceForecast {
    pub record: MaintenanceRecord,
    pub next_service_date: NaiveDate,
    pub days_until_next: i64,
    pub status: ServiceStatus,
}

impl ServiceForecast {
    pub fn evaluate(record: &MaintenanceRecord, today: NaiveDate) -> Self {
        let next_service_date = next_service_date(record);
        let days_until_next = (next_service_date - today).num_days();
        Self {
            record: record.clone(),
            next_service_date,
            days_until_next,
            status: ServiceStatus::from_days_until(days_until_next),
        }
    }
}

/// Records needing attention, each list in collection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub overdue: Vec<ServiceForecast>,
    pub due_soon: Vec<ServiceForecast>,
    pub total: usize,
}

impl AlertSummary {
    pub fn is_clear(&self) -> bool {
        self.overdue.is_empty() && self.due_soon.is_empty()
    }
}

/// Status queries bound to a clock. Holds no state beyond the clock, so every
/// call sees the current date.
#[derive(Debug, Clone, Default)]
pub struct Scheduler<C = SystemClock> {
    clock: C,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn next_service_date(&self, record: &MaintenanceRecord) -> NaiveDate {
        next_service_date(record)
    }

    pub fn days_until_next(&self, record: &MaintenanceRecord) -> i64 {
        days_until_next_on(record, self.today())
    }

    pub fn status(&self, record: &MaintenanceRecord) -> ServiceStatus {
        status_on(record, self.today())
    }

    pub fn forecast(&self, record: &MaintenanceRecord) -> ServiceForecast {
        ServiceForecast::evaluate(record, self.today())
    }

    pub fn forecasts<'a, I>(&self, records: I) -> Vec<ServiceForecast>
    where
        I: IntoIterator<Item = &'a MaintenanceRecord>,
    {
        let today = self.today();
        records
            .into_iter()
            .map(|record| ServiceForecast::evaluate(record, today))
            .collect()
    }

    pub fn alerts(&self, records: &[MaintenanceRecord]) -> AlertSummary {
        let mut summary = AlertSummary {
            total: records.len(),
            ..AlertSummary::default()
        };
        for forecast in self.forecasts(records) {
            match forecast.status {
                ServiceStatus::Overdue => summary.overdue.push(forecast),
                ServiceStatus::DueSoon => summary.due_soon.push(forecast),
                ServiceStatus::Ok => {}
            }
        }
        summary
    }
}
