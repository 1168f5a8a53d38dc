//! Synthetic daily sales generation.
//!
//! Produces a CSV in the same layout as the pharma sales export so the
//! training pipeline can run without the external dataset. Each category
//! follows
//!
//! ```text
//! sales(d) = max(0, base × weekly(d) × annual(d) + ε),  ε ~ N(0, (noise × base)²)
//! ```
//!
//! with a weekend dip and a winter peak that is stronger for respiratory and
//! antihistamine classes.

use std::f64::consts::PI;
use std::io::Write;
use std::path::Path;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::CategoryCatalog;
use crate::error::AppError;
use crate::io::SalesRow;

/// Mean daily units for a few well-known classes; others use 5.0.
const BASE_LEVELS: [(&str, f64); 8] = [
    ("M01AB", 5.0),
    ("M01AE", 3.8),
    ("N02BA", 3.9),
    ("N02BE", 30.0),
    ("N05B", 8.8),
    ("N05C", 0.3),
    ("R03", 5.0),
    ("R06", 2.9),
];

#[derive(Debug, Clone)]
pub struct SampleOptions {
    pub start: NaiveDate,
    pub days: usize,
    pub seed: u64,
    /// Noise std dev as a fraction of the base level.
    pub noise: f64,
}

pub fn generate_sales(catalog: &CategoryCatalog, opts: &SampleOptions) -> Result<Vec<SalesRow>, AppError> {
    if opts.days == 0 {
        return Err(AppError::validation("Sample day count must be > 0."));
    }
    if !(opts.noise.is_finite() && opts.noise >= 0.0) {
        return Err(AppError::validation("Noise level must be a non-negative number."));
    }

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::model(format!("Noise distribution error: {e}")))?;

    let bases: Vec<(f64, f64)> = catalog
        .entries()
        .iter()
        .map(|e| {
            let column = e.dataset_column();
            let base = BASE_LEVELS
                .iter()
                .find(|(code, _)| *code == column)
                .map(|(_, b)| *b)
                .unwrap_or(5.0);
            let seasonal_amp = if column.starts_with('R') { 0.35 } else { 0.1 };
            (base, seasonal_amp)
        })
        .collect();

    let mut rows = Vec::with_capacity(opts.days);
    for i in 0..opts.days {
        let date = opts
            .start
            .checked_add_days(Days::new(i as u64))
            .ok_or_else(|| AppError::validation("Sample range runs past the supported date range."))?;
        let weekly = match date.weekday() {
            Weekday::Sat => 0.8,
            Weekday::Sun => 0.6,
            _ => 1.05,
        };
        // Peaks around day 15 (mid-January).
        let phase = 2.0 * PI * (f64::from(date.ordinal()) - 15.0) / 365.25;

        let sales = bases
            .iter()
            .map(|&(base, amp)| {
                let annual = 1.0 + amp * phase.cos();
                let eps: f64 = normal.sample(&mut rng) * opts.noise * base;
                let value = (base * weekly * annual + eps).max(0.0);
                (value * 100.0).round() / 100.0
            })
            .collect();
        rows.push(SalesRow { date, sales });
    }
    Ok(rows)
}

/// Write rows as `datum,<dataset columns...>` with ISO dates.
pub fn write_sales_csv(path: &Path, catalog: &CategoryCatalog, rows: &[SalesRow]) -> Result<(), AppError> {
    let file = std::fs::File::create(path)
        .map_err(|e| AppError::data(format!("Failed to create CSV '{}': {e}", path.display())))?;
    write_sales(file, catalog, rows)
}

pub fn write_sales<W: Write>(out: W, catalog: &CategoryCatalog, rows: &[SalesRow]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    let write_err = |e: csv::Error| AppError::data(format!("Failed to write sales CSV: {e}"));

    let mut header = vec!["datum".to_string()];
    header.extend(catalog.entries().iter().map(|e| e.dataset_column().to_string()));
    writer.write_record(&header).map_err(write_err)?;

    for row in rows {
        let mut record = Vec::with_capacity(row.sales.len() + 1);
        record.push(row.date.format("%Y-%m-%d").to_string());
        record.extend(row.sales.iter().map(|v| v.to_string()));
        writer.write_record(&record).map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::data(format!("Failed to flush sales CSV: {e}")))?;
    Ok(())
}
