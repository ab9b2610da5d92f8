//! Job Scout CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use job_scout::{
    error::Result,
    models::{Config, Secrets},
    pipeline,
    services::SourceRegistry,
    sinks::{CsvExporter, RecordSink},
    utils::log as steps,
};

/// Job Scout - keyword job board scraper
#[derive(Parser, Debug)]
#[command(
    name = "job-scout",
    version,
    about = "Scrape job boards for keywords and deliver the listings"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape every board, deliver the results and send the notification mail
    Run {
        /// Deliver without sending the notification mail
        #[arg(long)]
        no_email: bool,
    },

    /// Scrape every board and write the CSV export only
    Scrape {
        /// CSV path (default: [output].csv_path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the configuration and board selectors
    Validate,

    /// List configured boards in search order
    Boards,
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

    let config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Command::Run { no_email } => {
            config.validate()?;
            let secrets = Secrets::from_env(config.delivery.mode)?;
            log::debug!("Loaded secrets: {:?}", secrets);

            steps::step(1, 2, "Scraping boards");
            let outcome = pipeline::run_scrape(&config).await?;

            steps::step(2, 2, "Delivering results");
            pipeline::run_delivery(&config, &secrets, &outcome.records, !no_email).await?;

            println!(
                "{}",
                pipeline::completion_message(config.delivery.mode, outcome.records.len())
            );
        }

        Command::Scrape { output } => {
            config.validate()?;
            let outcome = pipeline::run_scrape(&config).await?;

            let exporter = CsvExporter::new(output.unwrap_or_else(|| config.output.csv_path.clone()));
            let receipt = exporter.deliver(&outcome.records).await?;
            log::info!("{} jobs written to {}", receipt.rows, receipt.location);
        }

        Command::Validate => {
            if let Err(e) = pipeline::run_validate(&config) {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("All validations passed!");
        }

        Command::Boards => {
            let registry = SourceRegistry::from_configs(&config.boards)?;
            for (index, board) in registry.boards().iter().enumerate() {
                log::info!(
                    "{}. {} [{}] {} ({})",
                    index + 1,
                    board.id,
                    board.layout.kind(),
                    board.name,
                    board.url_template
                );
            }
        }
    }

    Ok(())
}
