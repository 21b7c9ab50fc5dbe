//! Checks applied to user-entered values before a record is built.
//!
//! The store accepts whatever it is handed; these helpers exist so every
//! front-end rejects the same inputs with the same messages.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("invalid interval '{0}' (expected a whole number of days)")]
    InvalidInterval(String),
}

/// Returns the trimmed name, or an error when nothing is left.
pub fn validate_name(name: &str) -> Result<&str, InputError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(InputError::EmptyName);
    }
    Ok(trimmed)
}

pub fn parse_service_date(input: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| InputError::InvalidDate(input.trim().to_string()))
}

pub fn parse_interval_days(input: &str) -> Result<i32, InputError> {
    input
        .trim()
        .parse::<i32>()
        .map_err(|_| InputError::InvalidInterval(input.trim().to_string()))
}
