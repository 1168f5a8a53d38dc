//! Training sample construction.
//!
//! Each sample pairs the feature row of `(date_i, h)` with, per category, the
//! fraction of a reference stock consumed over the `h` rows starting at `i`:
//!
//! ```text
//! target_c = Σ sales_c[i .. i+h] / stock_reference
//! ```
//!
//! Rows are treated as consecutive days; gaps in the export are not filled.

use crate::error::AppError;
use crate::features::feature_row;
use crate::io::SalesRow;

#[derive(Debug, Clone)]
pub struct TrainingSet {
    /// Row-major feature matrix, `FEATURE_NAMES` order.
    pub features: Vec<Vec<f64>>,
    /// One target vector per category (column-major), each `features.len()` long.
    pub targets: Vec<Vec<f64>>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

pub fn build_training_set(
    rows: &[SalesRow],
    horizons: &[u32],
    stock_reference: f64,
) -> Result<TrainingSet, AppError> {
    if horizons.is_empty() || horizons.contains(&0) {
        return Err(AppError::validation("Horizons must be a non-empty list of positive day counts."));
    }
    if !(stock_reference.is_finite() && stock_reference > 0.0) {
        return Err(AppError::validation("Stock reference must be a positive number."));
    }
    let Some(first) = rows.first() else {
        return Err(AppError::data("No sales rows to build samples from."));
    };
    let n_categories = first.sales.len();

    // prefix[c][k] = Σ sales_c[0..k]
    let mut prefix = vec![vec![0.0; rows.len() + 1]; n_categories];
    for (k, row) in rows.iter().enumerate() {
        for (c, p) in prefix.iter_mut().enumerate() {
            p[k + 1] = p[k] + row.sales[c];
        }
    }

    let mut features = Vec::new();
    let mut targets = vec![Vec::new(); n_categories];
    for &h in horizons {
        let h_len = h as usize;
        if h_len > rows.len() {
            continue;
        }
        for i in 0..=(rows.len() - h_len) {
            features.push(feature_row(rows[i].date, h).to_array().to_vec());
            for (c, t) in targets.iter_mut().enumerate() {
                t.push((prefix[c][i + h_len] - prefix[c][i]) / stock_reference);
            }
        }
    }

    if features.is_empty() {
        return Err(AppError::data(format!(
            "Not enough rows ({}) for any requested horizon {horizons:?}.",
            rows.len()
        )));
    }

    Ok(TrainingSet { features, targets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rows(values: &[f64]) -> Vec<SalesRow> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| SalesRow {
                date: start + chrono::Days::new(i as u64),
                sales: vec![v, 2.0 * v],
            })
            .collect()
    }

    #[test]
    fn window_sums_scaled_by_reference() {
        let set = build_training_set(&rows(&[1.0, 2.0, 3.0, 4.0]), &[2, 4], 10.0).unwrap();

        // h=2: 3 windows, h=4: 1 window.
        assert_eq!(set.len(), 4);
        assert_eq!(set.targets[0], vec![0.3, 0.5, 0.7, 1.0]);
        assert_eq!(set.targets[1], vec![0.6, 1.0, 1.4, 2.0]);

        assert_eq!(set.features[0][6], 2.0);
        assert_eq!(set.features[3][6], 4.0);
        // Second window starts on 2024-01-02.
        assert_eq!(set.features[1][4], 2.0);
    }

    #[test]
    fn horizons_longer_than_data_are_skipped() {
        let set = build_training_set(&rows(&[1.0, 1.0]), &[1, 30], 1.0).unwrap();
        assert_eq!(set.len(), 2);

        let err = build_training_set(&rows(&[1.0, 1.0]), &[30], 1.0).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn rejects_bad_settings() {
        assert!(build_training_set(&rows(&[1.0]), &[], 1.0).is_err());
        assert!(build_training_set(&rows(&[1.0]), &[0], 1.0).is_err());
        assert!(build_training_set(&rows(&[1.0]), &[1], 0.0).is_err());
        assert!(build_training_set(&[], &[1], 1.0).is_err());
    }
}
