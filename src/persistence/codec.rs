//! The one-record-per-line text format:
//!
//! ```text
//! id,name,YYYY-MM-DD,interval_days
//! ```
//!
//! Commas inside the name are written as `\,`. Line breaks inside the name
//! are written as a single space, so such names do not survive a round trip.

use super::RecordParseError;
use crate::MaintenanceRecord;
use chrono::NaiveDate;

const FIELD_COUNT: usize = 4;

pub fn encode_record_line(record: &MaintenanceRecord) -> String {
    format!(
        "{},{},{},{}",
        record.id(),
        escape_name(&record.name),
        record.last_service_date.format("%Y-%m-%d"),
        record.interval_days
    )
}

/// Parses one stored line. The caller is expected to have trimmed it.
pub fn parse_record_line(line: &str) -> Result<MaintenanceRecord, RecordParseError> {
    let fields = split_fields(line);
    if fields.len() < FIELD_COUNT {
        return Err(RecordParseError::FieldCount {
            found: fields.len(),
        });
    }
    let date = parse_date(fields[2])?;
    let interval = fields[3]
        .parse::<i32>()
        .map_err(|_| RecordParseError::InvalidInterval(fields[3].to_string()))?;
    Ok(MaintenanceRecord::with_id(
        fields[0],
        unescape_name(fields[1]),
        date,
        interval,
    ))
}

fn escape_name(name: &str) -> String {
    name.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .replace(',', "\\,")
}

fn unescape_name(name: &str) -> String {
    name.replace("\\,", ",")
}

/// Splits on the first three commas that are not preceded by a backslash.
/// Whatever follows the third delimiter is the last field, commas included.
fn split_fields(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut fields = Vec::with_capacity(FIELD_COUNT);
    let mut start = 0;
    for (idx, &byte) in bytes.iter().enumerate() {
        if fields.len() == FIELD_COUNT - 1 {
            break;
        }
        if byte == b',' && !(idx > 0 && bytes[idx - 1] == b'\\') {
            fields.push(&line[start..idx]);
            start = idx + 1;
        }
    }
    fields.push(&line[start..]);
    fields
}

/// Accepts `YYYY-MM-DD`, plus the signed form chrono writes for years
/// outside `0..=9999` (`+10000-01-01`, `-0001-01-01`).
pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, RecordParseError> {
    let invalid = || RecordParseError::InvalidDate(input.to_string());
    if !has_date_shape(input) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| invalid())
}

fn has_date_shape(input: &str) -> bool {
    let (signed, unsigned) = match input.strip_prefix(['+', '-']) {
        Some(rest) => (true, rest),
        None => (false, input),
    };
    let Some((year, month_day)) = unsigned.split_once('-') else {
        return false;
    };
    let year_ok = if signed {
        year.len() >= 4
    } else {
        year.len() == 4
    };
    let month_day = month_day.as_bytes();
    year_ok
        && year.bytes().all(|b| b.is_ascii_digit())
        && month_day.len() == 5
        && month_day.iter().enumerate().all(|(idx, &b)| match idx {
            2 => b == b'-',
            _ => b.is_ascii_digit(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaped_commas_do_not_split_fields() {
        assert_eq!(
            split_fields(r"id-1,Filters\, air,2024-05-01,30"),
            vec!["id-1", r"Filters\, air", "2024-05-01", "30"]
        );
    }

    #[test]
    fn split_stops_after_three_delimiters() {
        assert_eq!(
            split_fields("a,b,c,d,e"),
            vec!["a", "b", "c", "d,e"]
        );
        assert_eq!(split_fields("a,b"), vec!["a", "b"]);
    }

    #[test]
    fn newline_variants_collapse_to_single_spaces() {
        assert_eq!(escape_name("a\r\nb\nc\rd"), "a b c d");
    }

    #[test]
    fn dates_must_be_zero_padded() {
        assert!(parse_date("2024-1-01").is_err());
        assert!(parse_date("2024-01-01").is_ok());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn signed_years_need_at_least_four_digits() {
        assert_eq!(
            parse_date("+10000-01-01"),
            Ok(NaiveDate::from_ymd_opt(10000, 1, 1).unwrap())
        );
        assert_eq!(
            parse_date("-0001-12-31"),
            Ok(NaiveDate::from_ymd_opt(-1, 12, 31).unwrap())
        );
        assert!(parse_date("10000-01-01").is_err());
        assert!(parse_date("+999-01-01").is_err());
        assert!(parse_date("-2024-1-01").is_err());
    }
}
