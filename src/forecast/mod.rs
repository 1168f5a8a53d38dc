//! Forecast orchestration.
//!
//! - request decoding + validation (`request`)
//! - aggregation and introspection over the loaded model (`service`)

pub mod request;
pub mod service;

pub use request::*;
pub use service::*;
