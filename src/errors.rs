//! Error types for WDI Fetcher
//!
//! This module defines error types for all components of the application.
//! Errors are designed to be actionable and provide clear context for
//! debugging and user feedback.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while fetching from the upstream indicators API
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP transport failure calling the API
    #[error("HTTP request to the indicators API failed")]
    Upstream(#[from] reqwest::Error),

    /// Server returned a non-success status
    #[error("indicators API returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Maximum retries exceeded
    #[error("maximum retry attempts ({max_retries}) exceeded for {url}")]
    RetriesExhausted { max_retries: u32, url: String },

    /// JSON body could not be decoded
    #[error("JSON decoding of an API response failed")]
    Json(#[from] serde_json::Error),

    /// Response parsed as JSON but did not have the expected shape
    #[error("unexpected response shape from the indicators API: {reason}")]
    InvalidData { reason: String },

    /// Invalid URL constructed for a request
    #[error("invalid request URL: {url}")]
    InvalidUrl { url: String },

    /// A concurrently spawned fetch task panicked or was cancelled
    #[error("concurrent fetch task failed: {reason}")]
    TaskFailed { reason: String },
}

impl FetchError {
    /// Shorthand for shape errors discovered while parsing responses
    pub fn invalid_data(reason: impl Into<String>) -> Self {
        Self::InvalidData {
            reason: reason.into(),
        }
    }
}

/// Cache backend errors
///
/// `Unavailable` marks connection-level failures and is always recovered
/// by the gateway's local fallback; it never reaches callers.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Backend unreachable (connection failure, not a missing key)
    #[error("cache backend unreachable: {reason}")]
    Unavailable { reason: String },

    /// Cached value could not be serialized or deserialized
    #[error("cached value serialization failed")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// Shorthand for connection-level backend failures
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// I/O error reading configuration
    #[error("I/O error reading configuration")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Upstream fetch error
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Cache backend error
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable (transient)
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Fetch(FetchError::Upstream(_))
            | AppError::Fetch(FetchError::Status { .. })
            | AppError::Fetch(FetchError::RetriesExhausted { .. })
            | AppError::Cache(CacheError::Unavailable { .. }) => true,

            AppError::Fetch(FetchError::InvalidData { .. })
            | AppError::Fetch(FetchError::InvalidUrl { .. })
            | AppError::Config(_) => false,

            _ => false,
        }
    }

    /// Get error category for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Fetch(_) => "fetch",
            AppError::Cache(_) => "cache",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Fetch result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Cache result type alias
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
