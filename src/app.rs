//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - initializes logging and configuration
//! - dispatches to the server, training and tooling commands

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::{Command, InspectArgs, ProbeArgs, ServeArgs, SynthArgs, TrainArgs};
use crate::client::{ForecastClient, PROBE_CASES};
use crate::config::{DEFAULT_LOG_FILTER, ServiceConfig};
use crate::domain::CategoryCatalog;
use crate::error::AppError;
use crate::features::feature_row;
use crate::fit::TrainOptions;
use crate::models::ForecastModel;

pub mod pipeline;

/// Entry point for the `forecast` binary.
pub fn run() -> Result<(), AppError> {
    // `forecast` and `forecast --port 8080` behave like `forecast serve ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    init_tracing();
    dispatch(cli.command, ServiceConfig::from_env)
}

/// Run one command. Configuration is loaded only by the commands that read it.
fn dispatch(
    command: Command,
    load_config: impl Fn() -> Result<ServiceConfig, AppError>,
) -> Result<(), AppError> {
    match command {
        Command::Serve(args) => handle_serve(args, load_config()?),
        Command::Train(args) => handle_train(args, load_config()?),
        Command::Inspect(args) => handle_inspect(args, load_config()?),
        Command::Synth(args) => handle_synth(args),
        Command::Probe(args) => handle_probe(args),
    }
}

/// Logs go to stderr so command reports on stdout stay clean.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .init();
}

pub fn apply_serve_overrides(mut config: ServiceConfig, args: &ServeArgs) -> ServiceConfig {
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(model) = &args.model {
        config.model_path = model.clone();
    }
    config
}

fn handle_serve(args: ServeArgs, config: ServiceConfig) -> Result<(), AppError> {
    let config = apply_serve_overrides(config, &args);
    let service = pipeline::load_service(CategoryCatalog::pharma_sales(), &config.model_path)?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| AppError::config(format!("Failed to start async runtime: {e}")))?;
    runtime.block_on(crate::server::serve(&config, Arc::new(service)))
}

fn handle_train(args: TrainArgs, config: ServiceConfig) -> Result<(), AppError> {
    let catalog = CategoryCatalog::pharma_sales();
    let opts = TrainOptions {
        horizons: args.horizons.clone(),
        stock_reference: args.stock_reference,
        trained_at: Local::now().date_naive(),
    };
    let run = pipeline::run_training(&catalog, &args.data, &opts)?;

    println!(
        "{}",
        crate::report::format_training_summary(&run.data, run.n_samples, &run.artifact, &run.metrics)
    );

    let output = args.output.unwrap_or(config.model_path);
    crate::io::write_artifact_json(&output, &run.artifact)?;
    tracing::info!(path = %output.display(), "model saved");
    println!("Model written to {}", output.display());
    Ok(())
}

fn handle_inspect(args: InspectArgs, config: ServiceConfig) -> Result<(), AppError> {
    let path: PathBuf = args.model.unwrap_or(config.model_path);
    let artifact = crate::io::read_artifact_json(&path)?;

    let date = NaiveDate::from_ymd_opt(2024, 3, 1)
        .ok_or_else(|| AppError::config("Invalid inspection date."))?;
    let sample = artifact.predict(&feature_row(date, 30))?;

    println!(
        "{}",
        crate::report::format_model_summary(&artifact, &format!("{date} (30 days)"), &sample)
    );
    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let catalog = CategoryCatalog::pharma_sales();
    let opts = crate::data::SampleOptions {
        start: args.start,
        days: args.days,
        seed: args.seed,
        noise: args.noise,
    };
    let rows = crate::data::generate_sales(&catalog, &opts)?;
    crate::data::write_sales_csv(&args.output, &catalog, &rows)?;
    tracing::info!(path = %args.output.display(), rows = rows.len(), seed = args.seed, "synthetic sales written");
    println!("Wrote {} days of synthetic sales to {}", rows.len(), args.output.display());
    Ok(())
}

fn handle_probe(args: ProbeArgs) -> Result<(), AppError> {
    let client = ForecastClient::new(args.url);

    let types = client.drug_types()?;
    println!("{}", crate::report::format_drug_types(&types));

    let info = client.model_info()?;
    println!("{}", crate::report::format_model_info(&info));

    let mut results = Vec::with_capacity(PROBE_CASES.len());
    for case in &PROBE_CASES {
        match client.forecast(case) {
            Ok(result) => {
                println!(
                    "{} from {} for {} days, stock {}: prediction={:.4} quantity={} daily={:.2}",
                    case.drug_type,
                    case.date,
                    case.days,
                    case.stock_level,
                    result.prediction,
                    result.predicted_quantity,
                    result.average_daily
                );
                results.push((case.stock_level, result));
            }
            Err(err) => println!("{} from {}: {err}", case.drug_type, case.date),
        }
    }

    if !results.is_empty() {
        println!("\nSummary of results\n{}", crate::report::format_forecast_table(&results));
    }
    Ok(())
}

/// Rewrite argv so `forecast` defaults to `forecast serve`.
///
/// Rules:
/// - `forecast`                          -> `forecast serve`
/// - `forecast --port 8080 ...`          -> `forecast serve --port 8080 ...`
/// - `forecast --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("serve".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "serve" | "train" | "inspect" | "synth" | "probe");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "serve".to_string());
        return argv;
    }

    argv
}
