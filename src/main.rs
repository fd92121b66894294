//! WDI Fetcher CLI application
//!
//! Command-line interface for fetching World Bank development indicator
//! time-series, with concurrent page fetching and a resilient cache layer.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use wdi_fetcher::cli::{handle_cache, handle_countries, handle_fetch, Cli, Commands};
use wdi_fetcher::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    init_logging(&cli);

    info!("WDI Fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Fetch(args) => {
            info!("Executing fetch command");
            handle_fetch(args, &cli.global).await
        }
        Commands::Countries => {
            info!("Executing countries command");
            handle_countries(&cli.global).await
        }
        Commands::Cache(args) => {
            info!("Executing cache command");
            handle_cache(args, &cli.global).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("wdi_fetcher={}", log_level).parse().unwrap());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
