//! Command-line interface components
//!
//! This module contains CLI-specific code for the WDI Fetcher application,
//! including argument parsing and command handlers.

pub mod args;
pub mod commands;

pub use args::{CacheAction, CacheArgs, Cli, Commands, FetchArgs, GlobalArgs};
pub use commands::{handle_cache, handle_countries, handle_fetch};
