//! Command-line argument parsing for WDI Fetcher
//!
//! This module defines the CLI structure using clap derive macros,
//! providing a user-friendly interface for fetching indicators,
//! listing countries, and cache operations.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// WDI Fetcher - Download World Bank development indicators
#[derive(Parser, Debug)]
#[command(
    name = "wdi_fetcher",
    version,
    about = "Fetch World Bank development indicator time-series efficiently",
    long_about = "A tool for fetching numeric indicator time-series from the World Bank API.
Features concurrent page fetching, automatic retry logic, and a Redis cache with
transparent in-process fallback."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bypass the cache entirely (fetch fresh, write nothing)
    #[arg(long, global = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch indicator time-series
    Fetch(FetchArgs),

    /// List available countries
    Countries,

    /// Cache management and inspection
    Cache(CacheArgs),
}

/// Arguments for the fetch command
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Indicator ID to fetch (repeatable, e.g. "NY.GDP.MKTP.CD")
    #[arg(short, long = "indicator", required = true)]
    pub indicator: Vec<String>,

    /// ISO3 country code (repeatable)
    #[arg(short, long = "country", default_value = "USA")]
    pub country: Vec<String>,

    /// Print results as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

/// Arguments for cache management
#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache management actions
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show cache backend reachability and local entry count
    Status,

    /// Remove all cached entries from both backends
    Clear,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl FetchArgs {
    /// Reject blank indicator IDs or country codes before any network work
    pub fn validate(&self) -> Result<(), String> {
        if self.indicator.iter().any(|id| id.trim().is_empty()) {
            return Err("Indicator IDs must not be blank".to_string());
        }

        if self.country.iter().any(|code| code.trim().is_empty()) {
            return Err("Country codes must not be blank".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_args_parse() {
        let cli = Cli::try_parse_from([
            "wdi_fetcher",
            "fetch",
            "-i",
            "NY.GDP.MKTP.CD",
            "-i",
            "SP.POP.TOTL",
            "-c",
            "MKD",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.indicator.len(), 2);
                assert_eq!(args.country, vec!["MKD"]);
            }
            _ => panic!("expected fetch command"),
        }
    }

    #[test]
    fn test_fetch_requires_indicator() {
        let result = Cli::try_parse_from(["wdi_fetcher", "fetch"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_country_defaults_to_usa() {
        let cli = Cli::try_parse_from(["wdi_fetcher", "fetch", "-i", "SP.POP.TOTL"]).unwrap();
        match cli.command {
            Commands::Fetch(args) => assert_eq!(args.country, vec!["USA"]),
            _ => panic!("expected fetch command"),
        }
    }

    #[test]
    fn test_log_level_precedence() {
        let cli = Cli::try_parse_from(["wdi_fetcher", "--quiet", "--verbose", "countries"]).unwrap();
        assert_eq!(cli.log_level(), tracing::Level::ERROR);

        let cli = Cli::try_parse_from(["wdi_fetcher", "--very-verbose", "countries"]).unwrap();
        assert_eq!(cli.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_blank_indicator_rejected() {
        let args = FetchArgs {
            indicator: vec!["  ".to_string()],
            country: vec!["USA".to_string()],
            json: false,
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_cache_subcommands() {
        let cli = Cli::try_parse_from(["wdi_fetcher", "cache", "status"]).unwrap();
        match cli.command {
            Commands::Cache(args) => assert!(matches!(args.action, CacheAction::Status)),
            _ => panic!("expected cache command"),
        }
    }
}
