//! Mathematical utilities: standardization and least squares.

pub mod ols;
pub mod scaler;

pub use ols::*;
pub use scaler::*;
