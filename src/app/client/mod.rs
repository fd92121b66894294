//! HTTP client for the World Bank indicators API
//!
//! The module is organized into specialized components:
//! - `config`: client configuration and reqwest client building
//! - `http`: core HTTP operations with resilience patterns
//!
//! The client implements [`PageSource`], which is the seam the paged
//! fetcher fans out through; tests substitute an in-memory source.

use async_trait::async_trait;
use url::Url;

use crate::constants::api;
use crate::errors::{FetchError, FetchResult};
use crate::app::fetcher::{PageRequest, PageSource};
use crate::app::models::{IndicatorInfo, InfoRecord, RawPage};

pub mod config;
pub mod http;

pub use config::ClientConfig;

use http::HttpHandler;

/// Client for the paginated indicators API
///
/// Handles rate limiting, retries, and response shape validation.
pub struct WdiClient {
    http_handler: HttpHandler,
    base_url: Url,
}

impl WdiClient {
    /// Creates a client with default configuration
    pub fn new() -> FetchResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the base URL does not parse or the
    /// reqwest client cannot be built.
    pub fn with_config(config: ClientConfig) -> FetchResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|_| FetchError::InvalidUrl {
            url: config.base_url.clone(),
        })?;
        let client = config.build_http_client()?;
        let http_handler = HttpHandler::new(client, config.rate_limit_rps)?;

        tracing::debug!(base_url = %base_url, "created indicators API client");

        Ok(Self {
            http_handler,
            base_url,
        })
    }

    /// Fetches metadata (title and description) for one indicator
    ///
    /// The info endpoint is not paginated in practice; only the first
    /// record of the first page is meaningful.
    pub async fn indicator_info(&self, indicator_id: &str) -> FetchResult<IndicatorInfo> {
        let mut url = self.endpoint(&["indicator", indicator_id])?;
        url.query_pairs_mut()
            .append_pair(api::FORMAT_PARAM, api::FORMAT);

        let body = self.http_handler.get_json(&url).await?;
        let page = RawPage::from_body(body)?;
        let first = page.records.into_iter().next().ok_or_else(|| {
            FetchError::invalid_data(format!("no info record for indicator {}", indicator_id))
        })?;
        let record: InfoRecord = serde_json::from_value(first)?;
        Ok(record.into())
    }

    /// Get the base URL for the indicators API
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL for an endpoint path below the base URL
    fn endpoint(&self, segments: &[&str]) -> FetchResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl {
                url: self.base_url.to_string(),
            })?
            .extend(segments);
        Ok(url)
    }

    /// URL for one page of a paginated resource
    fn page_url(&self, request: &PageRequest, page: u32) -> FetchResult<Url> {
        let mut url = match request {
            PageRequest::IndicatorData {
                indicator_id,
                country_code,
            } => self.endpoint(&["country", country_code, "indicator", indicator_id])?,
            PageRequest::Countries => self.endpoint(&["country"])?,
        };
        url.query_pairs_mut()
            .append_pair(api::FORMAT_PARAM, api::FORMAT)
            .append_pair(api::PAGE_PARAM, &page.to_string());
        Ok(url)
    }
}

#[async_trait]
impl PageSource for WdiClient {
    async fn fetch_page(&self, request: &PageRequest, page: u32) -> FetchResult<RawPage> {
        let url = self.page_url(request, page)?;
        let body = self.http_handler.get_json(&url).await?;
        RawPage::from_body(body)
    }
}
