//! Daily sales CSV ingest.
//!
//! Turns a sales export (one row per day, one column per drug class) into a
//! date-sorted list of per-category sales, ready for sample construction.
//!
//! - **Strict schema** for the date column and every catalog category
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - No feature or target logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{CategoryCatalog, normalize_code};
use crate::error::AppError;

const DATE_COLUMNS: [&str; 2] = ["DATUM", "DATE"];

/// One day of sales, values in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRow {
    pub date: NaiveDate,
    pub sales: Vec<f64>,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct SalesData {
    /// Sorted by date.
    pub rows: Vec<SalesRow>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

pub fn load_sales_csv(path: &Path, catalog: &CategoryCatalog) -> Result<SalesData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::data(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_sales(file, catalog)
}

pub fn read_sales<R: Read>(input: R, catalog: &CategoryCatalog) -> Result<SalesData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::data(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = DATE_COLUMNS
        .iter()
        .find_map(|c| header_map.get(*c).copied())
        .ok_or_else(|| AppError::data("CSV is missing a 'datum' (or 'date') column."))?;
    let category_idx = resolve_category_columns(&header_map, catalog)?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, date_idx, &category_idx) {
            Ok(row) => rows.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if rows.is_empty() {
        return Err(AppError::data("No valid rows in sales CSV."));
    }
    rows.sort_by_key(|r| r.date);

    Ok(SalesData {
        rows,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    normalize_code(name.trim_start_matches('\u{feff}'))
}

/// Column index for each catalog entry, in catalog order.
fn resolve_category_columns(
    header_map: &HashMap<String, usize>,
    catalog: &CategoryCatalog,
) -> Result<Vec<usize>, AppError> {
    let mut out = Vec::with_capacity(catalog.len());
    let mut missing = Vec::new();
    for entry in catalog.entries() {
        let found = header_map
            .get(&normalize_code(entry.dataset_column()))
            .or_else(|| header_map.get(&entry.normalized_code()));
        match found {
            Some(&i) => out.push(i),
            None => missing.push(entry.dataset_column().to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(AppError::data(format!(
            "CSV is missing category columns: {}",
            missing.join(", ")
        )));
    }
    Ok(out)
}

fn parse_row(record: &StringRecord, date_idx: usize, category_idx: &[usize]) -> Result<SalesRow, String> {
    let raw_date = record.get(date_idx).unwrap_or("");
    let date = parse_sales_date(raw_date).ok_or_else(|| format!("Unparseable date '{raw_date}'"))?;

    let mut sales = Vec::with_capacity(category_idx.len());
    for &i in category_idx {
        let raw = record.get(i).unwrap_or("");
        let value: f64 = raw
            .parse()
            .map_err(|_| format!("Non-numeric sales value '{raw}' on {date}"))?;
        if !(value.is_finite() && value >= 0.0) {
            return Err(format!("Sales value must be non-negative, got {value} on {date}"));
        }
        sales.push(value);
    }

    Ok(SalesRow { date, sales })
}

/// Accepts `YYYY-MM-DD` and `M/D/YYYY`, ignoring a trailing time part.
fn parse_sales_date(raw: &str) -> Option<NaiveDate> {
    let day_part = raw.split_whitespace().next()?;
    NaiveDate::parse_from_str(day_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(day_part, "%m/%d/%Y"))
        .ok()
}
