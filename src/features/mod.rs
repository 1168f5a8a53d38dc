//! Calendar feature construction.
//!
//! The model conditions on a handful of calendar fields plus the forecast
//! horizon. A forecast always needs two rows: the start date and the date
//! `horizon` days later, both tagged with the same horizon.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::domain::{DEFAULT_HOUR, FeatureVector};
use crate::error::AppError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Start and end rows for one forecast horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizonRows {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start: FeatureVector,
    pub end: FeatureVector,
}

/// Parse a strict `YYYY-MM-DD` date.
///
/// chrono accepts unpadded fields (`2025-6-1`), so the shape is checked first.
pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return Err(invalid_date());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| invalid_date())
}

fn invalid_date() -> AppError {
    AppError::validation("Invalid date format. Use YYYY-MM-DD")
}

/// Feature row for a single date.
pub fn feature_row(date: NaiveDate, horizon_days: u32) -> FeatureVector {
    let month = date.month();
    FeatureVector {
        year: f64::from(date.year()),
        month: f64::from(month),
        hour: DEFAULT_HOUR,
        quarter: f64::from((month - 1) / 3 + 1),
        day_of_year: f64::from(date.ordinal()),
        is_weekend: if is_weekend(date) { 1.0 } else { 0.0 },
        prediction_days: f64::from(horizon_days),
    }
}

/// Add `days` to `date`, failing when the result leaves chrono's range.
pub fn end_date(date: NaiveDate, days: u32) -> Result<NaiveDate, AppError> {
    date.checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| AppError::validation("Forecast horizon runs past the supported date range."))
}

/// Build the start/end rows for a forecast.
pub fn horizon_rows(start_date: NaiveDate, horizon_days: u32) -> Result<HorizonRows, AppError> {
    let end_date = end_date(start_date, horizon_days)?;
    Ok(HorizonRows {
        start_date,
        end_date,
        start: feature_row(start_date, horizon_days),
        end: feature_row(end_date, horizon_days),
    })
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
