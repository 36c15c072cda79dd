use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coverage_checker::config::{BackendKind, Config};

mod commands;

use commands::{areas, check, suggest, validate_page, CheckParams};

#[derive(Parser)]
#[command(
    name = "coverage-checker",
    version,
    about = "Check whether an address lies inside the service coverage area",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); COVERAGE_* environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show address suggestions for a partial query
    Suggest {
        /// Partial address as typed by the user
        query: String,
    },

    /// Run a full coverage check for an address
    Check {
        /// Address to check
        address: String,

        /// Coverage backend to use instead of the configured one
        #[arg(short, long, value_enum)]
        backend: Option<BackendKind>,

        /// Seed for the simulated backend
        #[arg(long)]
        seed: Option<u64>,

        /// Write the resulting map (areas and marker) as GeoJSON
        #[arg(long)]
        geojson: Option<PathBuf>,
    },

    /// Print the configured coverage areas as GeoJSON
    Areas,

    /// Check that a page contains every element the checker binds to
    ValidatePage {
        /// HTML file to validate
        path: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_env()?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    coverage_checker::metrics::init_metrics().context("Failed to register metrics")?;

    tracing::debug!(config = ?cli.config, "Coverage checker starting");

    match cli.command {
        Commands::Suggest { query } => {
            tracing::info!(query = %query, "Starting suggest command");
            suggest(config, query).await?;
        }

        Commands::Check {
            address,
            backend,
            seed,
            geojson,
        } => {
            tracing::info!(
                address = %address,
                backend = ?backend,
                seed = ?seed,
                geojson = ?geojson,
                "Starting check command"
            );
            check(
                config,
                CheckParams {
                    address,
                    backend,
                    seed,
                    geojson,
                },
            )
            .await?;
        }

        Commands::Areas => {
            areas(&config)?;
        }

        Commands::ValidatePage { path } => {
            tracing::info!(path = %path.display(), "Starting validate-page command");
            validate_page(&path)?;
        }
    }

    tracing::debug!(metrics = %coverage_checker::metrics::gather(), "Run metrics");
    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("coverage_checker=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .or_else(|_| tracing_subscriber::EnvFilter::try_new(format!("coverage_checker={level},warn")))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
