//! Pipeline fitting.
//!
//! Given a training set we:
//! - fit the standard scaler on the feature matrix
//! - solve one least-squares problem per category on the scaled matrix
//!   (categories are independent, so they run in parallel)
//! - assemble the artifact in catalog order

use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::{CategoryCatalog, FEATURE_NAMES};
use crate::error::AppError;
use crate::fit::TrainingSet;
use crate::math::{StandardScaler, fit_with_intercept};
use crate::models::{LinearEstimator, MODEL_TYPE, ModelArtifact, MultiOutputLinear};

/// Minimum number of extra samples beyond parameter count.
const MIN_N_BUFFER: usize = 5;

#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub horizons: Vec<u32>,
    pub stock_reference: f64,
    pub trained_at: NaiveDate,
}

pub fn fit_pipeline(
    catalog: &CategoryCatalog,
    set: &TrainingSet,
    opts: &TrainOptions,
) -> Result<ModelArtifact, AppError> {
    let n = set.len();
    let p = FEATURE_NAMES.len();
    if n < p + 1 + MIN_N_BUFFER {
        return Err(AppError::data(format!(
            "Underdetermined: n={n} < k+{MIN_N_BUFFER}={}",
            p + 1 + MIN_N_BUFFER
        )));
    }
    if set.targets.len() != catalog.len() {
        return Err(AppError::data(format!(
            "Training set has {} target columns, catalog has {} categories.",
            set.targets.len(),
            catalog.len()
        )));
    }

    let scaler = StandardScaler::fit(&FEATURE_NAMES, &set.features)?;
    let mut scaled = Vec::with_capacity(n * p);
    for row in &set.features {
        scaled.extend(scaler.transform(row)?);
    }
    let x = DMatrix::from_row_slice(n, p, &scaled);

    let estimators: Vec<LinearEstimator> = catalog
        .entries()
        .par_iter()
        .zip(set.targets.par_iter())
        .map(|(entry, target)| {
            let y = DVector::from_column_slice(target);
            let fit = fit_with_intercept(&x, &y).ok_or_else(|| {
                AppError::model(format!("Least squares failed for category {}.", entry.code))
            })?;
            tracing::debug!(category = %entry.code, intercept = fit.intercept, "fitted estimator");
            Ok(LinearEstimator {
                target: entry.normalized_code(),
                intercept: fit.intercept,
                coefficients: fit.coefficients,
            })
        })
        .collect::<Result<_, AppError>>()?;

    let artifact = ModelArtifact {
        tool: env!("CARGO_PKG_NAME").to_string(),
        model_type: MODEL_TYPE.to_string(),
        trained_at: opts.trained_at,
        stock_reference: opts.stock_reference,
        horizons: opts.horizons.clone(),
        preprocessor: scaler,
        regressor: MultiOutputLinear { estimators },
    };
    artifact.validate()?;
    Ok(artifact)
}
