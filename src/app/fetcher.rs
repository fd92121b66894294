//! Concurrent pagination and record merging
//!
//! Page 1 of a resource is fetched synchronously to learn the total page
//! count; the remaining pages fan out fail-fast through the
//! [`coordinator`](crate::app::coordinator). Records from all pages are
//! merged into a single mapping keyed by the record's merge key (period
//! label for time-series, country name for the country table).
//!
//! Merge rules:
//! - records whose value field is null are dropped, never coerced to zero
//! - a merge key seen on a later page never overwrites an earlier value;
//!   the duplicate is reported as a warning, since it signals an
//!   upstream data inconsistency
//! - any single page failure fails the whole call; callers wanting
//!   partial tolerance compose independent calls per entity instead

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::constants::api;
use crate::errors::FetchResult;
use crate::app::coordinator;
use crate::app::models::{CountryRecord, DataRecord, RawPage, TimeSeries};

/// One paginated upstream resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// Time-series for one country/indicator pair
    IndicatorData {
        indicator_id: String,
        country_code: String,
    },
    /// The country name/code table
    Countries,
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndicatorData {
                indicator_id,
                country_code,
            } => write!(f, "data for {}/{}", country_code, indicator_id),
            Self::Countries => write!(f, "country table"),
        }
    }
}

/// Source of raw upstream pages
///
/// Implemented by the HTTP client; tests substitute an in-memory fake.
/// Page numbers are 1-based and assigned by the caller.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest, page: u32) -> FetchResult<RawPage>;
}

/// A record type that merges into a keyed mapping
///
/// `into_entry` returning `None` drops the record from the merge;
/// that is the data-cleaning path for null value fields, not an error.
pub trait PageRecord: DeserializeOwned {
    type Key: Eq + Hash + Ord + fmt::Display + Send;
    type Value: Send;

    fn into_entry(self) -> Option<(Self::Key, Self::Value)>;
}

impl PageRecord for DataRecord {
    type Key = String;
    type Value = f64;

    fn into_entry(self) -> Option<(String, f64)> {
        // Null measurements are dropped; an explicit zero is kept
        self.value.map(|value| (self.date, value))
    }
}

impl PageRecord for CountryRecord {
    type Key = String;
    type Value = String;

    fn into_entry(self) -> Option<(String, String)> {
        Some((self.name, self.id))
    }
}

/// Fetches every page of a paginated resource and merges the records
pub struct PagedFetcher<S> {
    source: Arc<S>,
}

impl<S> Clone for PagedFetcher<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: PageSource + 'static> PagedFetcher<S> {
    /// Create a fetcher over a shared page source
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Fetch all pages of a resource and merge their records
    ///
    /// Page 1 is fetched first to discover the total page count; pages
    /// `2..=pages` are then issued concurrently and merged in page
    /// order. The merge result is independent of completion order.
    pub async fn fetch_merged<R: PageRecord>(
        &self,
        request: &PageRequest,
    ) -> FetchResult<HashMap<R::Key, R::Value>> {
        let first = self.source.fetch_page(request, api::FIRST_PAGE).await?;
        let total_pages = first.meta.pages;
        debug!(%request, total_pages, "discovered page count");

        let mut merged = HashMap::new();
        merge_page::<R>(&mut merged, first)?;

        if total_pages <= 1 {
            return Ok(merged);
        }

        let tasks: Vec<_> = (2..=total_pages)
            .map(|page| {
                let source = Arc::clone(&self.source);
                let request = request.clone();
                async move { source.fetch_page(&request, page).await }
            })
            .collect();

        for page in coordinator::run_fail_fast(tasks).await? {
            merge_page::<R>(&mut merged, page)?;
        }

        Ok(merged)
    }

    /// Fetch a time-series, sorted ascending by period
    pub async fn fetch_series(&self, request: &PageRequest) -> FetchResult<TimeSeries> {
        let merged = self.fetch_merged::<DataRecord>(request).await?;
        // Explicit sort step: the merge map is unordered
        Ok(merged.into_iter().collect())
    }

    /// Fetch the country table as a name -> ISO3 code mapping, sorted
    /// ascending by name
    pub async fn fetch_countries(&self) -> FetchResult<BTreeMap<String, String>> {
        let merged = self
            .fetch_merged::<CountryRecord>(&PageRequest::Countries)
            .await?;
        Ok(merged.into_iter().collect())
    }
}

/// Decode and merge one page of records into the accumulator
///
/// First-seen values win; a duplicate merge key is surfaced as a
/// warning instead of being silently overwritten.
fn merge_page<R: PageRecord>(
    merged: &mut HashMap<R::Key, R::Value>,
    page: RawPage,
) -> FetchResult<()> {
    let page_number = page.meta.page;
    for raw in page.records {
        let record: R = serde_json::from_value(raw)?;
        let Some((key, value)) = record.into_entry() else {
            continue;
        };
        match merged.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(slot) => {
                warn!(
                    key = %slot.key(),
                    page = page_number,
                    "duplicate merge key across pages, keeping first value"
                );
            }
        }
    }
    Ok(())
}
