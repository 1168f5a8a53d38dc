//! Command-line parsing for the forecast service and its offline tools.
//!
//! Argument parsing and command dispatch stay separate from the service and
//! training code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::client::DEFAULT_BASE_URL;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Drug sales forecast service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the model and serve the HTTP API.
    Serve(ServeArgs),
    /// Train a model artifact from a daily sales CSV.
    Train(TrainArgs),
    /// Print the structure of a model artifact and a sample prediction.
    Inspect(InspectArgs),
    /// Generate a synthetic daily sales CSV.
    Synth(SynthArgs),
    /// Exercise the endpoints of a running service.
    Probe(ProbeArgs),
}

#[derive(Debug, Args, Clone, Default)]
pub struct ServeArgs {
    /// Bind address (overrides ML_SERVICE_HOST).
    #[arg(long)]
    pub host: Option<String>,

    /// Port (overrides ML_SERVICE_PORT).
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Model artifact JSON (overrides MODEL_PATH).
    #[arg(short = 'm', long)]
    pub model: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct TrainArgs {
    /// Daily sales CSV (`datum` column plus one column per drug class).
    #[arg(long, value_name = "CSV")]
    pub data: PathBuf,

    /// Where to write the artifact (defaults to MODEL_PATH).
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Forecast horizons (days) to build samples for.
    #[arg(long, value_delimiter = ',', default_value = "7,14,30")]
    pub horizons: Vec<u32>,

    /// Stock level the consumption ratios are expressed against.
    #[arg(long, default_value_t = 100.0)]
    pub stock_reference: f64,
}

#[derive(Debug, Args, Clone)]
pub struct InspectArgs {
    /// Model artifact JSON (defaults to MODEL_PATH).
    #[arg(short = 'm', long)]
    pub model: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    /// Output CSV path.
    #[arg(short = 'o', long)]
    pub output: PathBuf,

    /// First day of the series.
    #[arg(long, default_value = "2014-01-02")]
    pub start: NaiveDate,

    /// Number of days to generate.
    #[arg(long, default_value_t = 2106)]
    pub days: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Noise std dev as a fraction of each class's base level.
    #[arg(long, default_value_t = 0.25)]
    pub noise: f64,
}

#[derive(Debug, Args, Clone)]
pub struct ProbeArgs {
    /// Base URL of the running service.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub url: String,
}
