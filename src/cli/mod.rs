//! Command-line parsing for the sweep results analyzer.

use std::path::PathBuf;

use clap::Parser;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "rc",
    version,
    about = "Aggregate sweep results, fit r(c) curves and plot them"
)]
pub struct Cli {
    /// Raw results table (delimited text with a header row).
    #[arg(long = "res", value_name = "PATH")]
    pub res: PathBuf,

    /// Output directory for tables, plots and the run manifest.
    #[arg(long, value_name = "DIR", default_value = "/tmp/out/")]
    pub outdir: PathBuf,
}
