//! Shared workflows used by the CLI commands.
//!
//! Training: sales CSV -> samples -> scaler + per-category fits -> metrics.
//! Serving: artifact file -> validated model -> `ForecastService`.

use std::path::Path;
use std::sync::Arc;

use crate::domain::CategoryCatalog;
use crate::error::AppError;
use crate::fit::{CategoryMetrics, TrainOptions, build_training_set, evaluate, fit_pipeline};
use crate::forecast::ForecastService;
use crate::io::{SalesData, load_sales_csv, read_artifact_json};
use crate::models::ModelArtifact;

/// All computed outputs of a training run.
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub data: SalesData,
    pub n_samples: usize,
    pub artifact: ModelArtifact,
    pub metrics: Vec<CategoryMetrics>,
}

pub fn run_training(catalog: &CategoryCatalog, csv: &Path, opts: &TrainOptions) -> Result<TrainingRun, AppError> {
    tracing::info!(path = %csv.display(), "loading sales data");
    let data = load_sales_csv(csv, catalog)?;
    run_training_on(catalog, data, opts)
}

pub fn run_training_on(catalog: &CategoryCatalog, data: SalesData, opts: &TrainOptions) -> Result<TrainingRun, AppError> {
    tracing::info!(
        rows = data.rows.len(),
        skipped = data.row_errors.len(),
        "sales data loaded"
    );

    let set = build_training_set(&data.rows, &opts.horizons, opts.stock_reference)?;
    tracing::info!(samples = set.len(), horizons = ?opts.horizons, "training set built");

    let artifact = fit_pipeline(catalog, &set, opts)?;
    let metrics = evaluate(&artifact, &catalog.normalized_codes(), &set)?;
    for m in &metrics {
        tracing::info!(category = %m.category, mse = m.mse, mae = m.mae, r2 = m.r2, "in-sample metrics");
    }

    Ok(TrainingRun {
        data,
        n_samples: set.len(),
        artifact,
        metrics,
    })
}

/// Load the artifact and wrap it in a service. Any failure here is fatal to
/// startup.
pub fn load_service(catalog: CategoryCatalog, model_path: &Path) -> Result<ForecastService, AppError> {
    tracing::info!(path = %model_path.display(), "loading model");
    let artifact = read_artifact_json(model_path)?;
    tracing::info!(
        model_type = %artifact.model_type,
        trained_at = %artifact.trained_at,
        outputs = artifact.regressor.estimators.len(),
        "model loaded"
    );
    check_target_order(&catalog, &artifact)?;
    ForecastService::new(catalog, Arc::new(artifact))
}

/// Output column `i` must be the estimator trained for catalog entry `i`.
fn check_target_order(catalog: &CategoryCatalog, artifact: &ModelArtifact) -> Result<(), AppError> {
    let expected = catalog.normalized_codes();
    if artifact.targets() != expected {
        return Err(AppError::config(format!(
            "Model targets {:?} do not match the category order {expected:?}.",
            artifact.targets()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SampleOptions, generate_sales};
    use crate::features::parse_date;
    use crate::forecast::ForecastRequest;
    use crate::domain::FEATURE_NAMES;
    use crate::error::ErrorKind;
    use crate::io::{read_sales, write_artifact_json};
    use crate::math::StandardScaler;
    use crate::models::{LinearEstimator, MODEL_TYPE, MultiOutputLinear};
    use chrono::NaiveDate;

    /// Constant-output artifact: estimator `i` of `codes` predicts its
    /// catalog index / 10.
    fn constant_artifact(catalog: &CategoryCatalog, codes: &[String]) -> ModelArtifact {
        let p = FEATURE_NAMES.len();
        let estimators = codes
            .iter()
            .map(|code| LinearEstimator {
                target: code.clone(),
                intercept: catalog.index_of(code).unwrap() as f64 / 10.0,
                coefficients: vec![0.0; p],
            })
            .collect();
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
            regressor: MultiOutputLinear { estimators },
        }
    }

    fn synthetic(catalog: &CategoryCatalog) -> SalesData {
        let rows = generate_sales(
            catalog,
            &SampleOptions {
                start: NaiveDate::from_ymd_opt(2014, 1, 2).unwrap(),
                days: 730,
                seed: 3,
                noise: 0.2,
            },
        )
        .unwrap();
        let mut buf = Vec::new();
        crate::data::write_sales(&mut buf, catalog, &rows).unwrap();
        read_sales(buf.as_slice(), catalog).unwrap()
    }

    #[test]
    fn train_save_load_and_forecast() {
        let catalog = CategoryCatalog::pharma_sales();
        let opts = TrainOptions {
            horizons: vec![7, 14, 30],
            stock_reference: 100.0,
            trained_at: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        };
        let run = run_training_on(&catalog, synthetic(&catalog), &opts).unwrap();

        assert_eq!(run.metrics.len(), 8);
        assert!(run.metrics.iter().all(|m| m.mse.is_finite() && m.r2 <= 1.0));
        // The horizon dominates window sums, so the fit explains most variance.
        assert!(run.metrics.iter().filter(|m| m.category != "N05C").all(|m| m.r2 > 0.5));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        write_artifact_json(&path, &run.artifact).unwrap();

        let service = load_service(catalog, &path).unwrap();
        let req = ForecastRequest::new("N02BE/B", parse_date("2015-03-01").unwrap(), 30, 100.0).unwrap();
        let result = service.forecast(&req).unwrap();
        assert!(result.prediction.is_finite());
        // About 30 units/day of N02BE over 30 days against a stock of 100.
        assert!(result.prediction > 4.0 && result.prediction < 14.0, "{}", result.prediction);
        assert!(service.model_info().unwrap().feature_importance.len() == 10);
    }

    #[test]
    fn missing_model_file_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_service(CategoryCatalog::pharma_sales(), &dir.path().join("absent.json"))
            .err()
            .unwrap();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn artifact_targets_must_follow_catalog_order() {
        let catalog = CategoryCatalog::pharma_sales();
        let dir = tempfile::tempdir().unwrap();

        let mut reversed = catalog.normalized_codes();
        reversed.reverse();
        let path = dir.path().join("reversed.json");
        write_artifact_json(&path, &constant_artifact(&catalog, &reversed)).unwrap();
        let err = load_service(catalog.clone(), &path).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.exit_code(), 2);

        let path = dir.path().join("ordered.json");
        write_artifact_json(&path, &constant_artifact(&catalog, &catalog.normalized_codes())).unwrap();
        let service = load_service(catalog, &path).unwrap();
        let req = ForecastRequest::new("M01AB", parse_date("2025-06-01").unwrap(), 30, 100.0).unwrap();
        assert_eq!(service.forecast(&req).unwrap().prediction, 0.0);
        let req = ForecastRequest::new("R06", parse_date("2025-06-01").unwrap(), 30, 100.0).unwrap();
        assert!((service.forecast(&req).unwrap().prediction - 0.7).abs() < 1e-12);
    }
}
