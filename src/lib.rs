//! WDI Fetcher Library
//!
//! A Rust library for fetching World Bank development indicator time-series.
//! Provides concurrent page fetching with rate limiting, a Redis-backed
//! cache with transparent in-process fallback, and proper error handling.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
