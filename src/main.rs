//! Forage main entry point
//!
//! Command-line interface for the forum thread harvester.

use clap::Parser;
use forage::config::load_config_with_hash;
use forage::crawler::Orchestrator;
use forage::extract::XenforoExtractor;
use forage::fetch::BrowserFetcher;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Forage: a sequential forum thread harvester
///
/// Forage walks a forum's categories, threads, and paginated posts through
/// a headless browser, writing periodic JSON checkpoints so long runs can
/// fail without losing their progress.
#[derive(Parser, Debug)]
#[command(name = "forage")]
#[command(version)]
#[command(about = "A sequential forum thread harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!(
        "Target: {} ({} listing page(s) per category)",
        config.forum.root_url,
        config.crawler.listing_pages_per_category
    );

    // Wire the collaborators and run
    let fetcher = BrowserFetcher::new(config.browser.clone());
    let extractor = XenforoExtractor::new();
    let orchestrator = Orchestrator::new(config, Box::new(fetcher), Box::new(extractor));

    match orchestrator.run().await {
        Ok(state) => {
            tracing::info!(
                "Harvest completed: {} thread(s), {} attempted",
                state.len(),
                state.processed()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("forage=info,warn"),
            1 => EnvFilter::new("forage=debug,info"),
            2 => EnvFilter::new("forage=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
