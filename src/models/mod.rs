//! Forecast model interface and the trained pipeline implementing it.

pub mod model;
pub mod pipeline;

pub use model::*;
pub use pipeline::*;
