use super::codec::{encode_record_line, parse_record_line};
use super::{LoadReport, MalformedLine, PersistenceResult, RecordParseError, RecordStore};
use crate::scheduler::{Clock, Scheduler};
use crate::MaintenanceRecord;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Line-per-record store backed by a single text file.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileRecordStore {
    fn default() -> Self {
        Self::new(super::default_data_path())
    }
}

impl RecordStore for FileRecordStore {
    fn load_with_report(&self) -> PersistenceResult<LoadReport> {
        load_records(&self.path)
    }

    fn save(&self, records: &[MaintenanceRecord]) -> PersistenceResult<()> {
        save_records(records, &self.path)
    }
}

/// Reads every parseable record from `path`.
///
/// A missing file is created empty (parent directories included) and yields
/// no records. Lines that fail to parse are logged and reported, never fatal.
pub fn load_records<P: AsRef<Path>>(path: P) -> PersistenceResult<LoadReport> {
    let path = path.as_ref();
    if !path.exists() {
        ensure_file(path)?;
        info!(path = %path.display(), "created empty data file");
        return Ok(LoadReport::default());
    }

    let mut reader = BufReader::new(File::open(path)?);
    let mut report = LoadReport::default();
    let mut buf = Vec::new();
    let mut line_number = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_number += 1;
        let parsed = match std::str::from_utf8(&buf) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                parse_record_line(trimmed).map_err(|reason| (trimmed.to_string(), reason))
            }
            Err(_) => {
                let lossy = String::from_utf8_lossy(&buf);
                Err((lossy.trim().to_string(), RecordParseError::InvalidEncoding))
            }
        };
        match parsed {
            Ok(record) => report.records.push(record),
            Err((content, reason)) => {
                warn!(
                    path = %path.display(),
                    line = line_number,
                    error = %reason,
                    "skipping malformed line: {content}"
                );
                report.skipped.push(MalformedLine {
                    line_number,
                    content,
                    reason,
                });
            }
        }
    }
    debug!(
        path = %path.display(),
        loaded = report.records.len(),
        skipped = report.skipped.len(),
        "loaded maintenance records"
    );
    Ok(report)
}

/// Overwrites `path` with one line per record, in order.
pub fn save_records<P: AsRef<Path>>(records: &[MaintenanceRecord], path: P) -> PersistenceResult<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        writeln!(writer, "{}", encode_record_line(record))?;
    }
    writer.flush()?;
    debug!(path = %path.display(), saved = records.len(), "saved maintenance records");
    Ok(())
}

fn ensure_parent(path: &Path) -> PersistenceResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn ensure_file(path: &Path) -> PersistenceResult<()> {
    ensure_parent(path)?;
    OpenOptions::new().append(true).create(true).open(path)?;
    Ok(())
}

#[derive(Serialize, Deserialize)]
struct RecordsSnapshot {
    records: Vec<MaintenanceRecord>,
}

pub fn save_records_to_json<P: AsRef<Path>>(
    records: &[MaintenanceRecord],
    path: P,
) -> PersistenceResult<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let snapshot = RecordsSnapshot {
        records: records.to_vec(),
    };
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_records_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<MaintenanceRecord>> {
    let file = File::open(path)?;
    let snapshot: RecordsSnapshot = serde_json::from_reader(BufReader::new(file))?;
    Ok(snapshot.records)
}

const STATUS_REPORT_HEADER: [&str; 7] = [
    "id",
    "name",
    "last_service_date",
    "interval_days",
    "next_service_date",
    "days_until_next",
    "status",
];

#[derive(Serialize)]
struct StatusReportRow<'a> {
    id: &'a str,
    name: &'a str,
    last_service_date: String,
    interval_days: i32,
    next_service_date: String,
    days_until_next: i64,
    status: &'static str,
}

/// Writes a CSV report of every record evaluated against the scheduler's
/// current date.
pub fn export_status_report_csv<C, P>(
    records: &[MaintenanceRecord],
    scheduler: &Scheduler<C>,
    path: P,
) -> PersistenceResult<()>
where
    C: Clock,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    ensure_parent(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(STATUS_REPORT_HEADER)?;
    for forecast in scheduler.forecasts(records) {
        writer.serialize(StatusReportRow {
            id: forecast.record.id(),
            name: &forecast.record.name,
            last_service_date: forecast.record.last_service_date.format("%Y-%m-%d").to_string(),
            interval_days: forecast.record.interval_days,
            next_service_date: forecast.next_service_date.format("%Y-%m-%d").to_string(),
            days_until_next: forecast.days_until_next,
            status: forecast.status.as_str(),
        })?;
    }
    writer.flush()?;
    Ok(())
}
