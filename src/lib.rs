//! `drug-forecast` library crate.
//!
//! The binary (`forecast`) is a thin wrapper around this library so that:
//!
//! - the HTTP service and training pipeline are testable without spawning processes
//! - the model seam (`models::ForecastModel`) can be swapped in tests
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod fit;
pub mod forecast;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod server;
