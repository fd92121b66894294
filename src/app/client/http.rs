//! Core HTTP operations with rate limiting and retry logic
//!
//! Every upstream call flows through this handler: client-side rate
//! limiting with jitter, bounded exponential backoff on transport
//! errors and on HTTP 429/503, and JSON body decoding.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::Client;
use url::Url;

use crate::constants::limits;
use crate::errors::{FetchError, FetchResult};

/// HTTP operations handler with resilience patterns
pub struct HttpHandler {
    client: Client,
    rate_limiter: RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpHandler {
    /// Creates a new handler with the given client and rate limit
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidData` if the rate limit is zero.
    pub fn new(client: Client, rate_limit_rps: u32) -> FetchResult<Self> {
        let rate_limiter = Self::build_rate_limiter(rate_limit_rps)?;
        Ok(Self {
            client,
            rate_limiter,
        })
    }

    fn build_rate_limiter(
        rate_limit_rps: u32,
    ) -> FetchResult<RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>> {
        let quota = Quota::per_second(NonZeroU32::new(rate_limit_rps).ok_or_else(|| {
            FetchError::invalid_data("rate limit must be non-zero")
        })?);
        Ok(RateLimiter::direct(quota))
    }

    /// Performs one GET returning the parsed JSON body
    ///
    /// Transport errors and 429/503 responses are retried with
    /// exponential backoff up to `limits::MAX_RETRIES`; other
    /// non-success statuses fail immediately.
    pub async fn get_json(&self, url: &Url) -> FetchResult<serde_json::Value> {
        // Jitter avoids a thundering herd when a page fan-out starts
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
            .await;

        let mut retries = 0;
        loop {
            match self.client.get(url.as_str()).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.as_u16() == 429 || status.as_u16() == 503 {
                        if retries < limits::MAX_RETRIES {
                            retries += 1;
                            let delay = Duration::from_millis(
                                limits::RETRY_BASE_DELAY_MS * 2_u64.pow(retries),
                            );
                            tracing::warn!(
                                status = status.as_u16(),
                                "server busy, backing off for {}ms",
                                delay.as_millis()
                            );
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                        return Err(FetchError::RetriesExhausted {
                            max_retries: limits::MAX_RETRIES,
                            url: url.to_string(),
                        });
                    }

                    if !status.is_success() {
                        return Err(FetchError::Status {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    }

                    let body = response.json::<serde_json::Value>().await?;
                    tracing::debug!(%url, "fetched JSON response");
                    return Ok(body);
                }
                Err(e) if retries < limits::MAX_RETRIES => {
                    retries += 1;
                    let delay =
                        Duration::from_millis(limits::RETRY_BASE_DELAY_MS * 2_u64.pow(retries));
                    tracing::warn!(
                        "request failed (attempt {}/{}): {}. Retrying in {}ms",
                        retries,
                        limits::MAX_RETRIES,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!("request failed after {} retries: {}", limits::MAX_RETRIES, e);
                    return Err(FetchError::Upstream(e));
                }
            }
        }
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}
