//! Application constants for WDI Fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Environment variable overriding the indicators API base URL
    pub const API_BASE_URL: &str = "WDI_API_BASE_URL";

    /// Environment variable overriding the Redis connection URL
    pub const REDIS_URL: &str = "WDI_REDIS_URL";
}

/// Upstream indicators API
pub mod api {
    /// World Bank API v2 base URL
    pub const BASE_URL: &str = "https://api.worldbank.org/v2";

    /// Response format requested from the API
    pub const FORMAT: &str = "json";

    /// `page` query parameter name
    pub const PAGE_PARAM: &str = "page";

    /// `format` query parameter name
    pub const FORMAT_PARAM: &str = "format";

    /// First page number; pages are 1-based and assigned by the caller
    pub const FIRST_PAGE: u32 = 1;
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "WDI-Fetcher/0.1.0 (Development Indicators Tool)";

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 8;
}

/// Rate limiting and retry configuration
pub mod limits {
    /// Default rate limit for upstream requests (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 10;

    /// Maximum retry attempts for failed requests
    pub const MAX_RETRIES: u32 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const RETRY_BASE_DELAY_MS: u64 = 500;
}

/// Cache configuration constants
pub mod cache {
    use super::Duration;

    /// Default time-to-live for cached results (one day)
    pub const DEFAULT_TTL: Duration = Duration::from_secs(86_400);

    /// Prefix joined in front of every storage key
    pub const KEY_PREFIX: &str = "wdi";

    /// Separator between cache key components
    pub const KEY_SEPARATOR: &str = ":";

    /// Default Redis connection URL
    pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/0";
}

/// Logging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "info";
}

// Re-export commonly used constants for convenience
pub use api::BASE_URL as API_BASE_URL;
pub use cache::{DEFAULT_REDIS_URL, DEFAULT_TTL, KEY_PREFIX};
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
pub use limits::{DEFAULT_RATE_LIMIT_RPS, MAX_RETRIES, RETRY_BASE_DELAY_MS};
