//! HTTP client configuration and building

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::{api, http, limits};
use crate::errors::FetchResult;

/// Configuration for the upstream API client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the indicators API
    pub base_url: String,
    /// Request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Connection establishment timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Connection pool idle timeout
    #[serde(with = "humantime_serde")]
    pub pool_idle_timeout: Duration,
    /// Maximum connections per host
    pub pool_max_per_host: usize,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: api::BASE_URL.to_string(),
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            pool_idle_timeout: http::POOL_IDLE_TIMEOUT,
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
        }
    }
}

impl ClientConfig {
    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the rate limit
    pub fn with_rate_limit_rps(mut self, rps: u32) -> Self {
        self.rate_limit_rps = rps;
        self
    }

    /// Build a reqwest client from this configuration
    ///
    /// The upstream is expected to answer within a few seconds; the
    /// request timeout here is what keeps a hung call from stalling a
    /// page fan-out indefinitely.
    pub fn build_http_client(&self) -> FetchResult<Client> {
        let client = Client::builder()
            .user_agent(http::USER_AGENT)
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .pool_idle_timeout(self.pool_idle_timeout)
            .pool_max_idle_per_host(self.pool_max_per_host)
            .build()?;
        Ok(client)
    }
}
