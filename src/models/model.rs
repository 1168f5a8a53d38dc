//! The model seam.
//!
//! Everything downstream of feature construction talks to the model through
//! `ForecastModel`, so the aggregator can be driven by a deterministic stub in
//! tests and by the trained pipeline in production.

use crate::domain::FeatureVector;
use crate::error::AppError;

/// A pre-fit multi-output regressor.
///
/// `predict` returns one value per catalog category, in catalog order.
/// Implementations must not mutate state on inference: the service shares a
/// single instance across all request handlers.
pub trait ForecastModel: Send + Sync {
    /// Human-readable model description for `/model/info`.
    fn model_type(&self) -> &str;

    /// Length of every output vector.
    fn output_len(&self) -> usize;

    fn predict(&self, row: &FeatureVector) -> Result<Vec<f64>, AppError>;

    /// Names of the features seen by the regression stage.
    fn feature_names(&self) -> Result<Vec<String>, AppError>;

    /// Importance score per feature for the estimator behind `output`.
    fn feature_importances(&self, output: usize) -> Result<Vec<f64>, AppError>;
}
