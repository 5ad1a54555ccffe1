//! CLI argument parsing for exostat

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the study report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "exostat")]
#[command(version)]
#[command(about = "Statistical inference over exoplanet catalogue exports", long_about = None)]
pub struct Cli {
    /// CSV export to analyse (lines starting with '#' are skipped)
    #[arg(value_name = "CSV")]
    pub data: PathBuf,

    /// Study configuration (TOML); defaults to the built-in Kepler study
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Population filter override (e.g., -e "nonempty=pl_hostname;present=planet")
    #[arg(short = 'e', long = "expr", value_name = "EXPR")]
    pub filter: Option<String>,

    /// Run only the named analysis (repeatable)
    #[arg(long = "analysis", value_name = "NAME")]
    pub analyses: Vec<String>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Seed for the normality-test subsample
    #[arg(long = "seed", value_name = "SEED")]
    pub seed: Option<u64>,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
