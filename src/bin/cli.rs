//! Article Extractor CLI
//!
//! Reads URLs from a CSV, extracts article text and publication dates, and
//! writes one result row per URL.

use std::path::PathBuf;
use std::sync::Arc;

use article_extractor::{
    error::Result,
    models::Config,
    pipeline::{self, ExtractionPipeline},
    providers::GeminiProvider,
    utils::http,
};
use clap::{Parser, Subcommand};

/// article-extractor - Web Article Text and Date Extractor
#[derive(Parser, Debug)]
#[command(
    name = "article-extractor",
    version,
    about = "Extract article text and publication dates from URLs in a CSV"
)]
struct Cli {
    /// Path to the configuration file (YAML or TOML)
    #[arg(short, long, global = true, default_value = "config.yaml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract every URL of the input CSV
    Extract {
        /// Input CSV with an id column and URL columns
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match Config::load_validated(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Config validation failed for {}: {}", cli.config.display(), e);
            return Err(e);
        }
    };
    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Extract { input, output } => {
            if !input.exists() {
                log::error!("Input CSV not found at {}", input.display());
                return Err(article_extractor::error::AppError::config(
                    "Input CSV not found",
                ));
            }

            let client = http::create_client(&config.http)?;
            let provider = Arc::new(GeminiProvider::from_env(client, &config.llm)?);
            let pipeline = ExtractionPipeline::from_config(&config, provider)?;

            let summary = pipeline::run_extraction(&config, &pipeline, &input, &output).await?;

            log::info!(
                "Done: {} URLs, {} succeeded, {} failed",
                summary.total,
                summary.success,
                summary.errors
            );
        }

        Command::Validate => {
            log::info!("✓ Config OK");
            log::info!("    id column: {}", config.input.id_column);
            log::info!("    url columns: {}", config.input.url_columns.join(", "));
            log::info!(
                "    min text length: {}",
                config.extraction.min_text_length
            );
            log::info!("    llm model: {}", config.llm.model);
        }
    }

    Ok(())
}
