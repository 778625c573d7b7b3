//! Calendar date handling at the input boundary.
//!
//! Dates are plain ISO-8601 calendar dates (`YYYY-MM-DD`). Validation lives
//! here so that the goal store only ever sees well-formed `NaiveDate`s.

use chrono::{Local, NaiveDate};

use crate::error::{Error, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| Error::InvalidDateFormat(trimmed.to_string()))
}

/// Parse an optional date argument. Blank input means "no date".
pub fn parse_optional_date(input: Option<&str>) -> Result<Option<NaiveDate>> {
    match input.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value).map(Some),
    }
}

/// Format a date for display and storage.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Today's date in the local timezone, used to stamp completions.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
