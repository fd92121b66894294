//! Data models for WDI Fetcher
//!
//! This module defines the core data structures used throughout the
//! application: cache keys, upstream page shapes, wire records, and the
//! aggregated indicator results that end up in the cache.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::cache;
use crate::errors::{FetchError, FetchResult};

/// Kind of upstream resource a cache key addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Joined info + time-series for one country/indicator pair
    Indicator,
    /// Indicator metadata only
    IndicatorInfo,
    /// Indicator time-series only
    IndicatorData,
    /// Country name/code table
    Countries,
}

impl ResourceKind {
    /// Stable wire name used inside cache keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indicator => "indicator",
            Self::IndicatorInfo => "info",
            Self::IndicatorData => "data",
            Self::Countries => "countries",
        }
    }
}

/// Composite identifier for one cacheable unit
///
/// Components are joined in a fixed order, so equal logical keys always
/// serialize identically regardless of where they were constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: ResourceKind,
    pub entity: String,
    pub sub_entity: Option<String>,
}

impl CacheKey {
    /// Key for the joined indicator result of one country/indicator pair
    pub fn indicator(country_code: &str, indicator_id: &str) -> Self {
        Self {
            kind: ResourceKind::Indicator,
            entity: country_code.to_string(),
            sub_entity: Some(indicator_id.to_string()),
        }
    }

    /// Key for the merged country table
    pub fn countries() -> Self {
        Self {
            kind: ResourceKind::Countries,
            entity: "all".to_string(),
            sub_entity: None,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.kind.as_str(),
            cache::KEY_SEPARATOR,
            self.entity
        )?;
        if let Some(sub) = &self.sub_entity {
            write!(f, "{}{}", cache::KEY_SEPARATOR, sub)?;
        }
        Ok(())
    }
}

/// Pagination metadata carried in element 0 of every upstream response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Page number of this response (1-based)
    pub page: u32,
    /// Total number of pages for the resource
    pub pages: u32,
    /// Records per page; the API serves this as a number or a string
    #[serde(default, deserialize_with = "lenient_u32")]
    pub per_page: Option<u32>,
}

/// Accepts `50`, `"50"`, or a missing field
fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().map(|n| n as u32),
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

/// One raw upstream response unit: page metadata plus undecoded records
///
/// Element 1 of the response may be `null` when a page has no records;
/// that is treated as an empty page, not an error.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub meta: PageMeta,
    pub records: Vec<serde_json::Value>,
}

impl RawPage {
    /// Parse a two-element API response body
    pub fn from_body(body: serde_json::Value) -> FetchResult<Self> {
        let serde_json::Value::Array(mut elements) = body else {
            return Err(FetchError::invalid_data("response is not a JSON array"));
        };
        if elements.len() < 2 {
            // Error responses from the API are one-element arrays carrying
            // a message object instead of page data.
            return Err(FetchError::invalid_data(
                "response is not a two-element [meta, records] array",
            ));
        }

        let records = match elements.remove(1) {
            serde_json::Value::Null => Vec::new(),
            serde_json::Value::Array(records) => records,
            _ => {
                return Err(FetchError::invalid_data(
                    "records element is neither an array nor null",
                ))
            }
        };
        let meta: PageMeta = serde_json::from_value(elements.remove(0))?;

        Ok(Self { meta, records })
    }
}

/// One time-series record from the data endpoint
///
/// `value` is `None` for periods the source has no measurement for;
/// those records are dropped during the merge, never coerced to zero.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataRecord {
    pub date: String,
    pub value: Option<f64>,
}

/// One country record from the country list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CountryRecord {
    /// ISO3 country code
    pub id: String,
    pub name: String,
}

/// Mapping from period label (e.g. year) to numeric value,
/// iterated in ascending period order
pub type TimeSeries = BTreeMap<String, f64>;

/// Indicator metadata, immutable once fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorInfo {
    pub id: String,
    pub title: String,
    pub description: String,
}

/// Wire shape of one record from the indicator info endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct InfoRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "sourceNote", default)]
    pub source_note: String,
}

impl From<InfoRecord> for IndicatorInfo {
    fn from(record: InfoRecord) -> Self {
        Self {
            id: record.id,
            title: record.name.trim().to_string(),
            description: record.source_note.trim().to_string(),
        }
    }
}

/// Aggregated result for one country/indicator pair — the unit stored
/// in the cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub id: String,
    pub country_code: String,
    pub title: String,
    pub description: String,
    pub data: TimeSeries,
}

/// A country whose fetch failed during a multi-country join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedCountry {
    pub country_code: String,
    pub error: String,
}

/// Result of a multi-country collect-all join: the successful subset in
/// input order plus the identifiers that could not be fetched
#[derive(Debug, Clone, Default)]
pub struct CountryJoin {
    pub indicators: Vec<Indicator>,
    pub failed: Vec<FailedCountry>,
}

impl CountryJoin {
    /// True when every requested country was fetched
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Country codes that failed, for "could not fetch results for {list}"
    /// style notices
    pub fn failed_codes(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.country_code.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cache_key_component_order_is_fixed() {
        let a = CacheKey::indicator("USA", "NY.GDP.MKTP.CD");
        let b = CacheKey::indicator("USA", "NY.GDP.MKTP.CD");
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.to_string(), "indicator:USA:NY.GDP.MKTP.CD");
    }

    #[test]
    fn test_cache_key_without_sub_entity() {
        assert_eq!(CacheKey::countries().to_string(), "countries:all");
    }

    #[test]
    fn test_raw_page_parses_two_element_response() {
        let body = json!([
            {"page": 1, "pages": 3, "per_page": 50},
            [{"date": "2020", "value": 1.5}]
        ]);
        let page = RawPage::from_body(body).unwrap();
        assert_eq!(page.meta.page, 1);
        assert_eq!(page.meta.pages, 3);
        assert_eq!(page.meta.per_page, Some(50));
        assert_eq!(page.records.len(), 1);
    }

    #[test]
    fn test_raw_page_null_records_is_empty_page() {
        let body = json!([{"page": 2, "pages": 2, "per_page": "50"}, null]);
        let page = RawPage::from_body(body).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.meta.per_page, Some(50));
    }

    #[test]
    fn test_raw_page_rejects_error_shape() {
        // API errors come back as a one-element array with a message object
        let body = json!([{"message": [{"id": "120", "value": "Invalid indicator"}]}]);
        let result = RawPage::from_body(body);
        assert!(matches!(result, Err(FetchError::InvalidData { .. })));
    }

    #[test]
    fn test_info_record_trims_whitespace() {
        let record = InfoRecord {
            id: "SP.POP.TOTL".to_string(),
            name: "  Population, total \n".to_string(),
            source_note: " Total population counts all residents. ".to_string(),
        };
        let info: IndicatorInfo = record.into();
        assert_eq!(info.title, "Population, total");
        assert_eq!(info.description, "Total population counts all residents.");
    }

    #[test]
    fn test_time_series_iterates_in_ascending_period_order() {
        let mut series = TimeSeries::new();
        series.insert("2021".to_string(), 3.0);
        series.insert("1999".to_string(), 1.0);
        series.insert("2005".to_string(), 2.0);

        let periods: Vec<_> = series.keys().cloned().collect();
        assert_eq!(periods, vec!["1999", "2005", "2021"]);
    }

    #[test]
    fn test_country_join_failed_codes() {
        let join = CountryJoin {
            indicators: vec![],
            failed: vec![FailedCountry {
                country_code: "MKD".to_string(),
                error: "timed out".to_string(),
            }],
        };
        assert!(!join.is_complete());
        assert_eq!(join.failed_codes(), vec!["MKD"]);
    }
}
