//! Forecast request decoding and validation.
//!
//! The request body is decoded field by field from a JSON object rather than
//! through a derived struct so that every client mistake maps to one exact
//! error message.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::features::parse_date;

/// Fields checked for presence, in this order.
pub const REQUIRED_FIELDS: [&str; 4] = ["drug_type", "date", "days", "stock_level"];

/// A validated forecast request.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    /// Category code exactly as the caller sent it.
    pub drug_type: String,
    pub date: NaiveDate,
    /// Horizon in days, always > 0.
    pub days: u32,
    /// Always finite and >= 0.
    pub stock_level: f64,
}

impl ForecastRequest {
    pub fn new(drug_type: impl Into<String>, date: NaiveDate, days: u32, stock_level: f64) -> Result<Self, AppError> {
        if days == 0 {
            return Err(invalid_days());
        }
        if !(stock_level.is_finite() && stock_level >= 0.0) {
            return Err(invalid_stock());
        }
        Ok(Self {
            drug_type: drug_type.into(),
            date,
            days,
            stock_level,
        })
    }

    pub fn from_json(body: &Value) -> Result<Self, AppError> {
        let obj = body
            .as_object()
            .ok_or_else(|| AppError::validation("Request body must be a JSON object"))?;

        for field in REQUIRED_FIELDS {
            if !obj.contains_key(field) {
                return Err(AppError::validation(format!("Missing required field: {field}")));
            }
        }

        let date = match field(obj, "date") {
            Value::String(s) => parse_date(s)?,
            _ => return Err(AppError::validation("Invalid date format. Use YYYY-MM-DD")),
        };
        let days = parse_days(field(obj, "days"))?;
        let stock_level = parse_stock_level(field(obj, "stock_level"))?;
        let drug_type = match field(obj, "drug_type") {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        Self::new(drug_type, date, days, stock_level)
    }
}

fn field<'a>(obj: &'a Map<String, Value>, name: &str) -> &'a Value {
    obj.get(name).unwrap_or(&Value::Null)
}

/// Integer JSON numbers, integral floats and numeric strings are accepted.
fn parse_days(value: &Value) -> Result<u32, AppError> {
    let days = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 1e15).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match days {
        Some(d) if d > 0 => u32::try_from(d).map_err(|_| invalid_days()),
        _ => Err(invalid_days()),
    }
}

fn parse_stock_level(value: &Value) -> Result<f64, AppError> {
    let level = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    level
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(invalid_stock)
}

fn invalid_days() -> AppError {
    AppError::validation("Invalid days: must be a positive integer")
}

fn invalid_stock() -> AppError {
    AppError::validation("Invalid stock_level: must be a non-negative number")
}
