use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use maintenance_tracker::{
    Clock, FixedClock, RecordStore, ServiceStatus, StorageBackend, SystemClock, Tracker,
    TrackerConfig, export_status_report_csv, parse_interval_days, parse_service_date,
    save_records_to_json, validate_name,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

type CliTracker = Tracker<Box<dyn RecordStore + Send + Sync>, Box<dyn Clock + Send + Sync>>;

/// Interactive maintenance tracker.
#[derive(Parser)]
#[command(name = "maintenance-tracker", version, about)]
struct Args {
    /// Data file holding the maintenance records.
    #[arg(long, env = "MAINTENANCE_TRACKER_DATA", default_value = "data/items.csv")]
    data_file: PathBuf,

    /// Storage backend for the data file.
    #[arg(long, default_value_t = StorageBackend::Lines)]
    backend: StorageBackend,

    /// Evaluate statuses as of this date (YYYY-MM-DD) instead of today.
    #[arg(long, value_parser = parse_today)]
    today: Option<NaiveDate>,
}

fn parse_today(input: &str) -> Result<NaiveDate, String> {
    parse_service_date(input).map_err(|err| err.to_string())
}

fn print_help() {
    println!(
        "Commands:\n  help                                    Show this help\n  list                                    List records with next service date and status\n  add <YYYY-MM-DD> <interval_days> <name...>\n                                          Add a record\n  serviced <id> [YYYY-MM-DD]              Record a service (default: today)\n  rename <id> <name...>                   Rename a record\n  interval <id> <days>                    Change the service interval\n  delete <id>                             Remove a record\n  alerts                                  Show overdue and due-soon records\n  save                                    Write records to the data file\n  reload                                  Discard changes and reload the data file\n  export json <path>                      Write a JSON snapshot\n  export report <path>                    Write a CSV status report\n  quit|exit                               Save and exit"
    );
}

fn print_records(tracker: &CliTracker) {
    if tracker.is_empty() {
        println!("(no items)");
        return;
    }
    for (idx, forecast) in tracker.forecasts().iter().enumerate() {
        println!(
            "{}) {} -> next: {} (in {} days) [{}]",
            idx + 1,
            forecast.record,
            forecast.next_service_date,
            forecast.days_until_next,
            forecast.status
        );
    }
}

fn print_alerts(tracker: &CliTracker) {
    let summary = tracker.alerts();
    if summary.is_clear() {
        println!("No upcoming or overdue maintenance.");
        return;
    }
    for forecast in summary.overdue.iter().chain(summary.due_soon.iter()) {
        let how = match forecast.status {
            ServiceStatus::Overdue => format!("OVERDUE by {} days", forecast.days_until_next.abs()),
            _ => format!("due in {} days", forecast.days_until_next),
        };
        println!(
            "{} -> next: {} -> {}",
            forecast.record.name, forecast.next_service_date, how
        );
    }
    println!(
        "Overdue: {}, Due soon: {}, Total: {}",
        summary.overdue.len(),
        summary.due_soon.len(),
        summary.total
    );
}

fn add_record<'a>(tracker: &mut CliTracker, mut parts: impl Iterator<Item = &'a str>) {
    let (Some(date_s), Some(interval_s)) = (parts.next(), parts.next()) else {
        println!("Usage: add <YYYY-MM-DD> <interval_days> <name...>");
        return;
    };
    let date = match parse_service_date(date_s) {
        Ok(date) => date,
        Err(err) => {
            println!("Invalid input: {err}. Aborting add.");
            return;
        }
    };
    let interval = match parse_interval_days(interval_s) {
        Ok(days) => days,
        Err(err) => {
            println!("Invalid input: {err}. Aborting add.");
            return;
        }
    };
    let raw_name = parts.collect::<Vec<_>>().join(" ");
    let name = match validate_name(&raw_name) {
        Ok(name) => name.to_string(),
        Err(err) => {
            println!("Invalid input: {err}. Aborting add.");
            return;
        }
    };
    let record = tracker.add(name, date, interval);
    println!("Added: {record}");
}

fn save(tracker: &CliTracker, config: &TrackerConfig) {
    match tracker.save() {
        Ok(()) => {
            println!(
                "Saved {} items to {}",
                tracker.len(),
                config.data_file.display()
            );
        }
        Err(err) => println!("Failed to save: {err}"),
    }
}

fn export<'a>(tracker: &CliTracker, mut parts: impl Iterator<Item = &'a str>) {
    let (Some(kind), Some(path)) = (parts.next(), parts.next()) else {
        println!("Usage: export <json|report> <path>");
        return;
    };
    let result = match kind {
        "json" => save_records_to_json(tracker.records(), path),
        "report" => export_status_report_csv(tracker.records(), tracker.scheduler(), path),
        other => {
            println!("Unknown export format '{other}'. Use json or report.");
            return;
        }
    };
    match result {
        Ok(()) => println!("Exported {} items to {}", tracker.len(), path),
        Err(err) => println!("Export failed: {err}"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("maintenance_tracker=info")),
        )
        .init();

    let args = Args::parse();
    let config = TrackerConfig {
        data_file: args.data_file,
        backend: args.backend,
    };
    let clock: Box<dyn Clock + Send + Sync> = match args.today {
        Some(date) => Box::new(FixedClock(date)),
        None => Box::new(SystemClock),
    };
    let store = config.open_store()?;
    let (mut tracker, skipped) = Tracker::open(store, clock)?;
    for line in &skipped {
        println!(
            "Skipping malformed line {}: {} ({})",
            line.line_number, line.content, line.reason
        );
    }

    println!("Maintenance Tracker - type 'help' for commands");
    println!("Loaded {} items from {}", tracker.len(), config.data_file.display());

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                println!("Failed to read input: {err}. Exiting without saving.");
                break;
            }
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "list" => print_records(&tracker),
            "add" => add_record(&mut tracker, parts),
            "alerts" => print_alerts(&tracker),
            "serviced" => {
                let Some(id) = parts.next() else {
                    println!("Usage: serviced <id> [YYYY-MM-DD]");
                    continue;
                };
                let date = match parts.next().map(parse_service_date) {
                    Some(Ok(date)) => date,
                    Some(Err(err)) => {
                        println!("Invalid input: {err}");
                        continue;
                    }
                    None => tracker.today(),
                };
                match tracker.record_service(id, date) {
                    Ok(record) => println!("Updated: {record}"),
                    Err(err) => println!("Error: {err}"),
                }
            }
            "rename" => {
                let Some(id) = parts.next() else {
                    println!("Usage: rename <id> <name...>");
                    continue;
                };
                let raw_name = parts.collect::<Vec<_>>().join(" ");
                let name = match validate_name(&raw_name) {
                    Ok(name) => name.to_string(),
                    Err(err) => {
                        println!("Invalid input: {err}");
                        continue;
                    }
                };
                match tracker.rename(id, name) {
                    Ok(record) => println!("Updated: {record}"),
                    Err(err) => println!("Error: {err}"),
                }
            }
            "interval" => {
                let (Some(id), Some(days_s)) = (parts.next(), parts.next()) else {
                    println!("Usage: interval <id> <days>");
                    continue;
                };
                let days = match parse_interval_days(days_s) {
                    Ok(days) => days,
                    Err(err) => {
                        println!("Invalid input: {err}");
                        continue;
                    }
                };
                match tracker.set_interval(id, days) {
                    Ok(record) => println!("Updated: {record}"),
                    Err(err) => println!("Error: {err}"),
                }
            }
            "delete" => {
                let Some(id) = parts.next() else {
                    println!("Usage: delete <id>");
                    continue;
                };
                match tracker.remove(id) {
                    Ok(record) => println!("Deleted: {}", record.name),
                    Err(err) => println!("Error: {err}"),
                }
            }
            "save" => save(&tracker, &config),
            "reload" => match tracker.reload() {
                Ok(skipped) => println!(
                    "Reloaded {} items ({} skipped)",
                    tracker.len(),
                    skipped.len()
                ),
                Err(err) => println!("Failed to reload: {err}"),
            },
            "export" => export(&tracker, parts),
            "quit" | "exit" => {
                save(&tracker, &config);
                println!("Goodbye.");
                break;
            }
            other => println!("Unknown command '{other}'. Type 'help' for commands."),
        }
    }
    Ok(())
}
