use anyhow::{Context, Result};
use clap::Parser;
use exostat::cli::{Cli, OutputFormat};
use exostat::config::StudyConfig;
use exostat::{loader, report, study};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Build the study from the config file (or the built-in one) and CLI overrides
fn load_config(args: &Cli) -> Result<StudyConfig> {
    let mut config = match &args.config {
        Some(path) => StudyConfig::from_file(path)?,
        None => StudyConfig::default_kepler()?,
    };

    if let Some(expr) = &args.filter {
        config.population = expr.clone();
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if !args.analyses.is_empty() {
        config.select_analyses(&args.analyses)?;
    }

    config
        .validate()
        .context("Invalid study after applying CLI overrides")?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = load_config(&args)?;
    let table = loader::load_csv(&args.data)?;
    let result = study::run_study(&table, &config)?;

    match args.format {
        OutputFormat::Text => print!("{}", report::render_text(&result)),
        OutputFormat::Json => println!("{}", report::render_json(&result)?),
    }

    Ok(())
}
