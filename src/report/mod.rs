//! Reporting utilities: formatted terminal output.
//!
//! Formatting lives in one place so the service and training code stay free of
//! presentation concerns.

pub mod format;

pub use format::*;
