//! Per-feature standardization (`(x - mean) / scale`).

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Fitted standardization parameters, one entry per feature column.
///
/// `scale` is the population standard deviation. Constant columns get a scale
/// of 1.0 so they transform to 0 instead of NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit on row-major samples.
    pub fn fit(feature_names: &[&str], rows: &[Vec<f64>]) -> Result<Self, AppError> {
        let p = feature_names.len();
        if rows.is_empty() {
            return Err(AppError::data("Cannot fit scaler on an empty sample."));
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != p) {
            return Err(AppError::data(format!(
                "Sample row {bad} has {} features, expected {p}.",
                rows[bad].len()
            )));
        }

        let n = rows.len() as f64;
        let mut mean = vec![0.0; p];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0; p];
        for row in rows {
            for j in 0..p {
                let d = row[j] - mean[j];
                var[j] += d * d;
            }
        }
        let scale = var
            .into_iter()
            .map(|v| {
                let sd = (v / n).sqrt();
                if sd.is_finite() && sd > f64::EPSILON { sd } else { 1.0 }
            })
            .collect();

        Ok(Self {
            feature_names: feature_names.iter().map(|s| s.to_string()).collect(),
            mean,
            scale,
        })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, AppError> {
        if row.len() != self.n_features() {
            return Err(AppError::model(format!(
                "Scaler expects {} features, got {}.",
                self.n_features(),
                row.len()
            )));
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    /// Check internal consistency after deserialization.
    pub fn validate(&self) -> Result<(), AppError> {
        let p = self.feature_names.len();
        if self.mean.len() != p || self.scale.len() != p {
            return Err(AppError::config(format!(
                "Scaler shape mismatch: {p} names, {} means, {} scales.",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.mean.iter().any(|v| !v.is_finite()) {
            return Err(AppError::config("Scaler mean contains non-finite values."));
        }
        if self.scale.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
            return Err(AppError::config("Scaler scale must be finite and positive."));
        }
        Ok(())
    }
}
