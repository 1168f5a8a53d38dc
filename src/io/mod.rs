//! Input/output helpers.
//!
//! - sales CSV ingest + validation (`ingest`)
//! - model artifact JSON read/write (`artifact`)

pub mod artifact;
pub mod ingest;

pub use artifact::*;
pub use ingest::*;
