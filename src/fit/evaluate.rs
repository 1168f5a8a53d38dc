//! In-sample fit diagnostics per category.

use serde::Serialize;

use crate::domain::FeatureVector;
use crate::error::AppError;
use crate::fit::TrainingSet;
use crate::models::ForecastModel;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMetrics {
    pub category: String,
    pub mse: f64,
    pub mae: f64,
    /// `1 - SSE/SST`; 0.0 when the target is constant.
    pub r2: f64,
}

pub fn evaluate(
    model: &dyn ForecastModel,
    categories: &[String],
    set: &TrainingSet,
) -> Result<Vec<CategoryMetrics>, AppError> {
    if set.is_empty() {
        return Err(AppError::data("Cannot evaluate on an empty training set."));
    }

    let mut predictions: Vec<Vec<f64>> = vec![Vec::with_capacity(set.len()); categories.len()];
    for row in &set.features {
        let out = model.predict(&row_to_vector(row)?)?;
        if out.len() != categories.len() {
            return Err(AppError::model(format!(
                "Model returned {} outputs, expected {}.",
                out.len(),
                categories.len()
            )));
        }
        for (p, v) in predictions.iter_mut().zip(out) {
            p.push(v);
        }
    }

    Ok(categories
        .iter()
        .zip(predictions.iter().zip(&set.targets))
        .map(|(name, (pred, obs))| metrics(name, pred, obs))
        .collect())
}

fn metrics(category: &str, pred: &[f64], obs: &[f64]) -> CategoryMetrics {
    let n = obs.len() as f64;
    let mean = obs.iter().sum::<f64>() / n;
    let mut sse = 0.0;
    let mut sae = 0.0;
    let mut sst = 0.0;
    for (p, y) in pred.iter().zip(obs) {
        let r = y - p;
        sse += r * r;
        sae += r.abs();
        sst += (y - mean) * (y - mean);
    }
    CategoryMetrics {
        category: category.to_string(),
        mse: sse / n,
        mae: sae / n,
        r2: if sst > 0.0 { 1.0 - sse / sst } else { 0.0 },
    }
}

fn row_to_vector(row: &[f64]) -> Result<FeatureVector, AppError> {
    let [year, month, hour, quarter, day_of_year, is_weekend, prediction_days] = row else {
        return Err(AppError::data(format!("Feature row has {} values.", row.len())));
    };
    Ok(FeatureVector {
        year: *year,
        month: *month,
        hour: *hour,
        quarter: *quarter,
        day_of_year: *day_of_year,
        is_weekend: *is_weekend,
        prediction_days: *prediction_days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_by_hand() {
        let m = metrics("X", &[1.0, 2.0, 3.0], &[1.0, 3.0, 5.0]);
        assert!((m.mse - 5.0 / 3.0).abs() < 1e-12);
        assert!((m.mae - 1.0).abs() < 1e-12);
        // SST = 8, SSE = 5.
        assert!((m.r2 - (1.0 - 5.0 / 8.0)).abs() < 1e-12);

        let flat = metrics("Y", &[2.0, 2.0], &[2.0, 2.0]);
        assert_eq!(flat.r2, 0.0);
        assert_eq!(flat.mse, 0.0);
    }

    #[test]
    fn short_rows_are_rejected() {
        assert!(row_to_vector(&[1.0, 2.0]).is_err());
        let v = row_to_vector(&[2025.0, 6.0, 12.0, 2.0, 152.0, 1.0, 30.0]).unwrap();
        assert_eq!(v.day_of_year, 152.0);
    }
}
