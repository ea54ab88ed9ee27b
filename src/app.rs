//! Top-level application orchestration.
//!
//! `src/main.rs` only maps the result to an exit code; this module is the
//! "real main" that:
//! - loads `.env` and installs the log subscriber
//! - parses CLI arguments into a `RunConfig`
//! - runs the analysis pipeline
//! - prints the run summary

use std::time::Instant;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::domain::{FitOptions, RunConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `rc` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let argv: Vec<String> = std::env::args().collect();
    let cli = Cli::parse_from(&argv);
    let config = config_from_args(&cli);

    let started = Instant::now();
    let output = pipeline::run(&config, &argv)?;

    println!("{}", crate::report::format_run_summary(&output));
    info!(
        elapsed_secs = started.elapsed().as_secs_f64(),
        outdir = %output.outdir.display(),
        "run finished"
    );
    Ok(())
}

pub fn config_from_args(cli: &Cli) -> RunConfig {
    RunConfig {
        results_path: cli.res.clone(),
        outdir: cli.outdir.clone(),
        fit: FitOptions::default(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
