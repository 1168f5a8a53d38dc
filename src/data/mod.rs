//! Data sources for training.

pub mod sample;

pub use sample::*;
