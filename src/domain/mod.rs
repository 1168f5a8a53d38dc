//! Domain types used throughout the service.
//!
//! This module defines:
//!
//! - the drug category catalog (`DrugCategory`, `CategoryCatalog`)
//! - the model input schema (`FeatureVector`, `FEATURE_NAMES`)
//! - forecast and introspection outputs (`ForecastResult`, `ModelInfo`)

pub mod types;

pub use types::*;
