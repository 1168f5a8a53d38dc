//! Offline training.
//!
//! Responsibilities:
//!
//! - turn daily sales into (features, consumption ratio) samples
//! - fit scaler + per-category least squares (parallel)
//! - report in-sample diagnostics

pub mod evaluate;
pub mod fitter;
pub mod samples;

pub use evaluate::*;
pub use fitter::*;
pub use samples::*;
