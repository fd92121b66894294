//! Joining partial fetch results into aggregated indicators
//!
//! Two join shapes exist:
//!
//! - **info + data**: metadata and time-series for one entity are
//!   fetched concurrently; if either sub-fetch fails the whole join
//!   fails with that error (the sibling future is dropped)
//! - **multi-entity**: the same indicator across several countries runs
//!   collect-all; the result carries the successful subset plus the
//!   identifiers that failed, so a caller can report "could not fetch
//!   results for {list}" without aborting the whole view

use std::future::Future;

use crate::errors::FetchResult;
use crate::app::coordinator;
use crate::app::models::{CountryJoin, FailedCountry, Indicator, IndicatorInfo, TimeSeries};

/// Join independently fetched metadata and time-series for one entity
///
/// Both futures run concurrently; the first failure cancels the other
/// and becomes the join's error.
pub async fn join_info_and_data<FI, FD>(
    indicator_id: &str,
    country_code: &str,
    info: FI,
    data: FD,
) -> FetchResult<Indicator>
where
    FI: Future<Output = FetchResult<IndicatorInfo>>,
    FD: Future<Output = FetchResult<TimeSeries>>,
{
    let (info, data) = tokio::try_join!(info, data)?;

    Ok(Indicator {
        id: indicator_id.to_string(),
        country_code: country_code.to_string(),
        title: info.title,
        description: info.description,
        data,
    })
}

/// Join one indicator across several countries, tolerating per-country
/// failures
///
/// All fetches run to completion; results are partitioned into the
/// successful indicators (in input order) and the failed country codes
/// with their error text.
pub async fn join_countries<F>(country_codes: Vec<String>, tasks: Vec<F>) -> CountryJoin
where
    F: Future<Output = FetchResult<Indicator>> + Send + 'static,
{
    debug_assert_eq!(country_codes.len(), tasks.len());

    let results = coordinator::run_collect_all(tasks).await;

    let mut join = CountryJoin::default();
    for (country_code, result) in country_codes.into_iter().zip(results) {
        match result {
            Ok(indicator) => join.indicators.push(indicator),
            Err(error) => {
                tracing::warn!(country_code, %error, "country fetch failed in multi-country join");
                join.failed.push(FailedCountry {
                    country_code,
                    error: error.to_string(),
                });
            }
        }
    }
    join
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::errors::FetchError;

    fn sample_info() -> IndicatorInfo {
        IndicatorInfo {
            id: "SP.POP.TOTL".to_string(),
            title: "Population, total".to_string(),
            description: "Total population.".to_string(),
        }
    }

    fn sample_series() -> TimeSeries {
        TimeSeries::from([("2020".to_string(), 331.0)])
    }

    fn sample_indicator(country_code: &str) -> Indicator {
        Indicator {
            id: "SP.POP.TOTL".to_string(),
            country_code: country_code.to_string(),
            title: "Population, total".to_string(),
            description: "Total population.".to_string(),
            data: sample_series(),
        }
    }

    #[tokio::test]
    async fn test_join_builds_indicator_from_both_parts() {
        let indicator = join_info_and_data(
            "SP.POP.TOTL",
            "USA",
            async { Ok(sample_info()) },
            async { Ok(sample_series()) },
        )
        .await
        .unwrap();

        assert_eq!(indicator.id, "SP.POP.TOTL");
        assert_eq!(indicator.country_code, "USA");
        assert_eq!(indicator.title, "Population, total");
        assert_eq!(indicator.data["2020"], 331.0);
    }

    #[tokio::test]
    async fn test_join_fails_when_info_fails() {
        let result = join_info_and_data(
            "SP.POP.TOTL",
            "USA",
            async { Err(FetchError::invalid_data("no info record")) },
            async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(sample_series())
            },
        )
        .await;

        // Fails with the info error without waiting out the data future
        match result {
            Err(FetchError::InvalidData { reason }) => assert_eq!(reason, "no info record"),
            other => panic!("expected InvalidData, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_join_fails_when_data_fails() {
        let result = join_info_and_data(
            "SP.POP.TOTL",
            "USA",
            async { Ok(sample_info()) },
            async {
                Err(FetchError::Status {
                    status: 500,
                    url: "fake://data".to_string(),
                })
            },
        )
        .await;
        assert!(matches!(result, Err(FetchError::Status { .. })));
    }

    #[tokio::test]
    async fn test_multi_country_partial_success() {
        let codes = vec!["USA".to_string(), "MKD".to_string(), "ALB".to_string()];
        let tasks: Vec<std::pin::Pin<Box<dyn Future<Output = FetchResult<Indicator>> + Send>>> = vec![
            Box::pin(async { Ok(sample_indicator("USA")) }),
            Box::pin(async { Err(FetchError::invalid_data("bad response for MKD")) }),
            Box::pin(async { Ok(sample_indicator("ALB")) }),
        ];

        let join = join_countries(codes, tasks).await;

        assert_eq!(join.indicators.len(), 2);
        assert_eq!(join.indicators[0].country_code, "USA");
        assert_eq!(join.indicators[1].country_code, "ALB");
        assert_eq!(join.failed_codes(), vec!["MKD"]);
        assert!(!join.is_complete());
    }

    #[tokio::test]
    async fn test_multi_country_all_succeed() {
        let codes = vec!["USA".to_string(), "ALB".to_string()];
        let tasks: Vec<std::pin::Pin<Box<dyn Future<Output = FetchResult<Indicator>> + Send>>> = vec![
            Box::pin(async { Ok(sample_indicator("USA")) }),
            Box::pin(async { Ok(sample_indicator("ALB")) }),
        ];

        let join = join_countries(codes, tasks).await;
        assert!(join.is_complete());
        assert_eq!(join.indicators.len(), 2);
    }
}
