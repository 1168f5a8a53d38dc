//! Ordinary least squares with an intercept.
//!
//! Training solves one small regression per drug category:
//!
//! ```text
//! minimize Σ (y_i - b - x_i^T β)^2
//! ```
//!
//! over standardized calendar features. The design is tall (thousands of rows,
//! eight columns) and can be rank deficient: `Hour` is constant, so its
//! standardized column is all zeros. SVD with a singular-value cutoff gives the
//! minimum-norm solution in that case, which leaves such coefficients at zero.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if no tolerance yields a finite solution.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fitted intercept and slopes.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

/// Fit `y ≈ intercept + x β`, where `x` has no intercept column.
pub fn fit_with_intercept(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<LinearFit> {
    if x.nrows() != y.len() || x.nrows() == 0 {
        return None;
    }
    let design = x.clone().insert_column(0, 1.0);
    let beta = solve_least_squares(&design, y)?;
    Some(LinearFit {
        intercept: beta[0],
        coefficients: beta.iter().skip(1).copied().collect(),
    })
}
