use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses a document date as stored in the `sales` table.
///
/// Only the calendar date is kept. Time-of-day and timezone offsets are accepted
/// and discarded.
pub fn parse_doc_date(field: &str, raw: &str) -> Result<NaiveDate, CoreError> {
    let value = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(datetime.date());
        }
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.date_naive());
    }

    Err(CoreError::InvalidInput(
        field.to_string(),
        format!("'{value}' is not a recognised date"),
    ))
}

/// Parses a quantity or price from its textual SQLite representation.
pub fn parse_amount(field: &str, raw: &str) -> Result<Decimal, CoreError> {
    let value = raw.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|e| CoreError::InvalidInput(field.to_string(), format!("'{value}': {e}")))
}
