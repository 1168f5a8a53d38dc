//! Forecast aggregation and model introspection.
//!
//! `ForecastService` owns the immutable catalog and a shared handle to the
//! loaded model. It is constructed once at startup and handed to the HTTP
//! layer as state; every method takes `&self`.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::domain::{CategoryCatalog, DrugCategory, FeatureImportance, FeatureVector, ForecastResult, ModelInfo};
use crate::error::AppError;
use crate::features::horizon_rows;
use crate::forecast::ForecastRequest;
use crate::models::ForecastModel;

/// Number of entries reported by `model_info`.
pub const TOP_FEATURES: usize = 10;

pub struct ForecastService {
    catalog: CategoryCatalog,
    model: Arc<dyn ForecastModel>,
}

impl ForecastService {
    /// Fails when the model's output width does not match the catalog.
    pub fn new(catalog: CategoryCatalog, model: Arc<dyn ForecastModel>) -> Result<Self, AppError> {
        if model.output_len() != catalog.len() {
            return Err(AppError::config(format!(
                "Model produces {} outputs but the catalog has {} categories.",
                model.output_len(),
                catalog.len()
            )));
        }
        Ok(Self { catalog, model })
    }

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    pub fn drug_types(&self) -> &[DrugCategory] {
        self.catalog.entries()
    }

    /// Average the start/end predictions for the requested category and turn
    /// the ratio into a quantity.
    ///
    /// The average is the midpoint of an assumed near-linear trend over the
    /// horizon, not an integral.
    pub fn forecast(&self, req: &ForecastRequest) -> Result<ForecastResult, AppError> {
        tracing::info!(
            drug_type = %req.drug_type,
            date = %req.date,
            days = req.days,
            stock_level = req.stock_level,
            "forecast request"
        );

        let column = self.catalog.resolve(&req.drug_type)?;
        let rows = horizon_rows(req.date, req.days)?;
        tracing::debug!(start = ?rows.start, end = ?rows.end, "feature rows");

        let start_ratio = self.predict_column(&rows.start, column)?;
        let end_ratio = self.predict_column(&rows.end, column)?;
        let prediction = (start_ratio + end_ratio) / 2.0;

        // Truncation toward zero; `as` saturates on overflow.
        let predicted_quantity = (prediction * req.stock_level).trunc() as i64;
        let average_daily = predicted_quantity as f64 / f64::from(req.days);

        let result = ForecastResult {
            prediction,
            date: rows.start_date,
            end_date: rows.end_date,
            predicted_quantity,
            average_daily,
            drug_type: self.catalog.entries()[column].normalized_code(),
            days: req.days,
        };
        tracing::info!(
            drug_type = %result.drug_type,
            start_ratio,
            end_ratio,
            prediction = result.prediction,
            predicted_quantity = result.predicted_quantity,
            average_daily = result.average_daily,
            "forecast result"
        );
        Ok(result)
    }

    fn predict_column(&self, row: &FeatureVector, column: usize) -> Result<f64, AppError> {
        let out = self
            .model
            .predict(row)
            .map_err(|e| AppError::model(format!("Error making prediction: {e}")))?;
        out.get(column).copied().ok_or_else(|| {
            AppError::model(format!(
                "Error making prediction: model returned {} outputs, expected {}",
                out.len(),
                self.catalog.len()
            ))
        })
    }

    /// Top feature importances across all per-category estimators.
    pub fn model_info(&self) -> Result<ModelInfo, AppError> {
        let names = self.model.feature_names()?;
        let mut importances = Vec::with_capacity(names.len() * self.catalog.len());

        for (i, entry) in self.catalog.entries().iter().enumerate() {
            let scores = self.model.feature_importances(i)?;
            if scores.len() != names.len() {
                return Err(AppError::model(format!(
                    "Estimator {} reports {} importances for {} features.",
                    entry.code,
                    scores.len(),
                    names.len()
                )));
            }
            let code = entry.normalized_code();
            importances.extend(names.iter().zip(scores).map(|(feat, imp)| FeatureImportance {
                name: format!("{feat} ({code})"),
                importance: imp,
            }));
        }

        importances.sort_by(|a, b| b.importance.partial_cmp(&a.importance).unwrap_or(Ordering::Equal));
        importances.truncate(TOP_FEATURES);

        Ok(ModelInfo {
            model_type: self.model.model_type().to_string(),
            feature_importance: importances,
        })
    }
}
