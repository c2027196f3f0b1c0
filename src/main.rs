// src/main.rs

//! Timetable scraper CLI.
//!
//! Local execution entry point: loads the TOML configuration, selects a
//! source profile and runs the scrape pipeline against the configured
//! sqlite store. Exits non-zero on unhandled top-level failure.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use rozvrh_scraper::error::{AppError, Result};
use rozvrh_scraper::models::Config;
use rozvrh_scraper::pipeline::run_scraper;
use rozvrh_scraper::store::SqliteStore;
use rozvrh_scraper::utils::{HttpFetcher, IntervalPacer};

/// University timetable scraper
#[derive(Parser, Debug)]
#[command(name = "rozvrh-scraper", version, about = "University timetable scraper")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the scrape pipeline for one institution
    Scrape {
        /// University short name selecting the source profile (e.g., UK)
        #[arg(long)]
        university: String,

        /// Faculty short name narrowing the profile selection (e.g., FF)
        #[arg(long)]
        faculty: Option<String>,
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

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Scrape {
            university,
            faculty,
        } => {
            config.validate()?;
            let source = config
                .find_source(&university, faculty.as_deref())
                .ok_or_else(|| {
                    AppError::config(format!(
                        "no source profile for university '{university}'{}",
                        faculty
                            .as_deref()
                            .map(|f| format!(", faculty '{f}'"))
                            .unwrap_or_default()
                    ))
                })?;

            let store = SqliteStore::connect(&config.database.url).await?;
            let fetcher = HttpFetcher::new(&config.scraper)?;
            let pacer = IntervalPacer::from_millis(config.scraper.request_delay_ms);

            let summary = run_scraper(source, &fetcher, &store, &pacer).await?;
            log::info!(
                "Job {}: {} programs discovered, {} lectures written, {} errors",
                summary.job_id,
                summary.programs_discovered,
                summary.records_processed,
                summary.error_count
            );
            if summary.error_count > 0 {
                log::warn!("Run completed with partial failures; inspect the job error log");
            }
        }
        Command::Validate => {
            config.validate()?;
            log::info!("Configuration OK");
            log::info!("  user agent: {}", config.scraper.user_agent);
            log::info!("  timeout: {}s", config.scraper.timeout_secs);
            log::info!("  request delay: {}ms", config.scraper.request_delay_ms);
            log::info!("  database: {}", config.database.url);
            for source in &config.sources {
                log::info!(
                    "  source {}: {} ({} listing pages)",
                    source.id,
                    source.base_url,
                    source.listing_pages
                );
            }
        }
    }

    Ok(())
}
