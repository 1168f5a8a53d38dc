//! Trained pipeline: standard scaler followed by one linear estimator per
//! drug category.
//!
//! The whole pipeline serializes to a single JSON document (see
//! `io::artifact`) so that training and serving share one file.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{FEATURE_NAMES, FeatureVector};
use crate::error::AppError;
use crate::math::StandardScaler;
use crate::models::ForecastModel;

pub const MODEL_TYPE: &str = "MultiOutput LinearRegression";

/// Intercept and slopes over standardized features for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearEstimator {
    /// Normalized category code this estimator predicts.
    pub target: String,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearEstimator {
    pub fn predict(&self, scaled: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(scaled)
                .map(|(b, x)| b * x)
                .sum::<f64>()
    }

    /// `|β_j| / Σ|β|`; all zeros when every slope is zero.
    pub fn importances(&self) -> Vec<f64> {
        let total: f64 = self.coefficients.iter().map(|b| b.abs()).sum();
        if !(total.is_finite() && total > 0.0) {
            return vec![0.0; self.coefficients.len()];
        }
        self.coefficients.iter().map(|b| b.abs() / total).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiOutputLinear {
    pub estimators: Vec<LinearEstimator>,
}

/// The persisted model: metadata plus both pipeline stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub tool: String,
    pub model_type: String,
    pub trained_at: NaiveDate,
    /// Stock level the training targets were expressed against.
    pub stock_reference: f64,
    /// Horizons (days) present in the training sample.
    pub horizons: Vec<u32>,
    pub preprocessor: StandardScaler,
    pub regressor: MultiOutputLinear,
}

impl ModelArtifact {
    /// Check that the artifact matches the feature schema and is internally
    /// consistent. Called on every load.
    pub fn validate(&self) -> Result<(), AppError> {
        self.preprocessor.validate()?;

        let names: Vec<&str> = self.preprocessor.feature_names.iter().map(String::as_str).collect();
        if names != FEATURE_NAMES {
            return Err(AppError::config(format!(
                "Model feature schema {names:?} does not match expected {FEATURE_NAMES:?}."
            )));
        }

        if self.regressor.estimators.is_empty() {
            return Err(AppError::config("Model has no estimators."));
        }
        for est in &self.regressor.estimators {
            if est.coefficients.len() != FEATURE_NAMES.len() {
                return Err(AppError::config(format!(
                    "Estimator '{}' has {} coefficients, expected {}.",
                    est.target,
                    est.coefficients.len(),
                    FEATURE_NAMES.len()
                )));
            }
            if !est.intercept.is_finite() || est.coefficients.iter().any(|b| !b.is_finite()) {
                return Err(AppError::config(format!(
                    "Estimator '{}' has non-finite parameters.",
                    est.target
                )));
            }
        }
        Ok(())
    }

    pub fn targets(&self) -> Vec<&str> {
        self.regressor.estimators.iter().map(|e| e.target.as_str()).collect()
    }
}

impl ForecastModel for ModelArtifact {
    fn model_type(&self) -> &str {
        &self.model_type
    }

    fn output_len(&self) -> usize {
        self.regressor.estimators.len()
    }

    fn predict(&self, row: &FeatureVector) -> Result<Vec<f64>, AppError> {
        let scaled = self.preprocessor.transform(&row.to_array())?;
        let out: Vec<f64> = self
            .regressor
            .estimators
            .iter()
            .map(|est| est.predict(&scaled))
            .collect();
        if out.iter().any(|v| !v.is_finite()) {
            return Err(AppError::model("Model produced a non-finite prediction."));
        }
        Ok(out)
    }

    fn feature_names(&self) -> Result<Vec<String>, AppError> {
        Ok(self.preprocessor.feature_names.clone())
    }

    fn feature_importances(&self, output: usize) -> Result<Vec<f64>, AppError> {
        self.regressor
            .estimators
            .get(output)
            .map(LinearEstimator::importances)
            .ok_or_else(|| AppError::model(format!("No estimator for output column {output}.")))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::features::feature_row;

    /// Two-output artifact with an identity scaler, handy for hand-checked math.
    pub(crate) fn tiny_artifact() -> ModelArtifact {
        let p = FEATURE_NAMES.len();
        ModelArtifact {
            tool: "forecast".to_string(),
            model_type: MODEL_TYPE.to_string(),
            trained_at: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            stock_reference: 100.0,
            horizons: vec![30],
            preprocessor: StandardScaler {
                feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                mean: vec![0.0; p],
                scale: vec![1.0; p],
            },
            regressor: MultiOutputLinear {
                estimators: vec![
                    LinearEstimator {
                        target: "A".to_string(),
                        intercept: 0.5,
                        coefficients: vec![0.0; p],
                    },
                    LinearEstimator {
                        target: "B".to_string(),
                        intercept: 0.0,
                        // 0.01 per month, -0.002 per horizon day.
                        coefficients: vec![0.0, 0.01, 0.0, 0.0, 0.0, 0.0, -0.002],
                    },
                ],
            },
        }
    }

    #[test]
    fn predicts_one_value_per_estimator() {
        let artifact = tiny_artifact();
        artifact.validate().unwrap();

        let row = feature_row(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(), 30);
        let out = artifact.predict(&row).unwrap();
        assert_eq!(out.len(), 2);
        assert!((out[0] - 0.5).abs() < 1e-12);
        assert!((out[1] - (0.06 - 0.06)).abs() < 1e-12);
    }

    #[test]
    fn importances_are_normalized_absolute_slopes() {
        let artifact = tiny_artifact();
        assert_eq!(artifact.feature_importances(0).unwrap(), vec![0.0; 7]);

        let imp = artifact.feature_importances(1).unwrap();
        assert!((imp[1] - 0.01 / 0.012).abs() < 1e-12);
        assert!((imp[6] - 0.002 / 0.012).abs() < 1e-12);
        assert!((imp.iter().sum::<f64>() - 1.0).abs() < 1e-12);

        assert!(artifact.feature_importances(2).is_err());
    }

    #[test]
    fn validation_rejects_schema_drift() {
        let mut artifact = tiny_artifact();
        artifact.preprocessor.feature_names.swap(0, 1);
        assert!(artifact.validate().is_err());

        let mut artifact = tiny_artifact();
        artifact.regressor.estimators[1].coefficients.pop();
        assert!(artifact.validate().is_err());

        let mut artifact = tiny_artifact();
        artifact.regressor.estimators[0].intercept = f64::NAN;
        assert!(artifact.validate().is_err());

        let mut artifact = tiny_artifact();
        artifact.regressor.estimators.clear();
        assert!(artifact.validate().is_err());
    }
}
