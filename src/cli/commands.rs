//! Command handlers for WDI Fetcher CLI
//!
//! This module implements the main command handlers that coordinate between
//! CLI arguments and the core application functionality.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::app::{
    CacheGateway, Indicator, IndicatorService, RedisBackend, TimeSeries, WdiClient,
};
use crate::cli::{CacheAction, CacheArgs, FetchArgs, GlobalArgs};
use crate::config::AppConfig;
use crate::errors::{AppError, FetchError, Result};

/// Handle the fetch command
///
/// Fetches every requested indicator for the requested countries. A
/// single country runs fail-fast across indicators; several countries
/// run collect-all so one unreachable country does not sink the rest.
pub async fn handle_fetch(args: FetchArgs, global: &GlobalArgs) -> Result<()> {
    let start_time = Instant::now();
    args.validate().map_err(AppError::generic)?;

    info!(
        "Fetching {} indicator(s) for {} country(ies)",
        args.indicator.len(),
        args.country.len()
    );

    let service = build_service(global).await?;
    let no_cache = global.no_cache;

    if args.country.len() == 1 {
        let country = &args.country[0];
        let indicators = if no_cache {
            service.indicators_uncached(&args.indicator, country).await?
        } else {
            service.indicators(&args.indicator, country).await?
        };

        if args.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&indicators).map_err(FetchError::Json)?
            );
        } else {
            for indicator in &indicators {
                print_indicator(indicator);
            }
        }
    } else {
        for indicator_id in &args.indicator {
            let join = if no_cache {
                service
                    .indicator_for_countries_uncached(indicator_id, &args.country)
                    .await
            } else {
                service
                    .indicator_for_countries(indicator_id, &args.country)
                    .await
            };

            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&join.indicators).map_err(FetchError::Json)?
                );
            } else {
                for indicator in &join.indicators {
                    print_indicator(indicator);
                }
            }

            if !join.is_complete() {
                let codes = join.failed_codes().join(", ");
                warn!("Incomplete results for {}: {}", indicator_id, codes);
                println!("⚠️  Could not fetch results for: {}", codes);
            }
        }
    }

    info!("Fetch completed in {:?}", start_time.elapsed());
    Ok(())
}

/// Handle the countries command
pub async fn handle_countries(global: &GlobalArgs) -> Result<()> {
    let service = build_service(global).await?;

    let countries = if global.no_cache {
        service.countries_uncached().await?
    } else {
        service.countries().await?
    };

    println!("🌍 {} countries available", countries.len());
    println!();
    for (name, code) in &countries {
        println!("  {:4} {}", code, name);
    }

    Ok(())
}

/// Handle cache management commands
pub async fn handle_cache(args: CacheArgs, global: &GlobalArgs) -> Result<()> {
    let service = build_service(global).await?;

    match args.action {
        CacheAction::Status => handle_cache_status(&service).await,
        CacheAction::Clear => handle_cache_clear(&service).await,
    }
}

/// Show backend reachability and local entry count
async fn handle_cache_status(service: &IndicatorService<RedisBackend>) -> Result<()> {
    println!("🔍 Cache Status");
    println!("===============");

    let status = service.gateway().status().await;

    let reachability = if status.distributed_reachable {
        "✅ reachable"
    } else {
        "❌ unreachable (serving from local fallback)"
    };
    println!("  Distributed backend: {}", reachability);
    println!("  Local fallback entries: {}", status.local_entries);

    Ok(())
}

/// Clear both cache layers
async fn handle_cache_clear(service: &IndicatorService<RedisBackend>) -> Result<()> {
    service.gateway().clear().await;
    println!("🧹 Cache cleared");
    Ok(())
}

/// Build the indicator service from configuration
///
/// The Redis backend is created lazily; an unreachable server surfaces
/// on first use as a fallback to the local cache, not as a startup error.
async fn build_service(global: &GlobalArgs) -> Result<IndicatorService<RedisBackend>> {
    let config = AppConfig::load(global.config.clone()).await?;

    let client = Arc::new(WdiClient::with_config(config.client.clone())?);
    let backend = RedisBackend::new(&config.cache.redis_url)?;
    let gateway = CacheGateway::new(backend, config.cache.key_prefix.clone());

    Ok(IndicatorService::new(
        client,
        gateway,
        config.cache.default_ttl,
    ))
}

/// Print a one-indicator summary: title, description, and series span
fn print_indicator(indicator: &Indicator) {
    println!(
        "📊 {} — {} [{}]",
        indicator.id, indicator.title, indicator.country_code
    );

    if !indicator.description.is_empty() {
        println!("   {}", indicator.description);
    }

    match series_span(&indicator.data) {
        Some((first, last)) => {
            println!(
                "   {} data points ({} to {})",
                indicator.data.len(),
                first,
                last
            );
        }
        None => println!("   no data points"),
    }
    println!();
}

/// First and last period keys of a series, if any
fn series_span(data: &TimeSeries) -> Option<(&str, &str)> {
    let first = data.keys().next()?;
    let last = data.keys().next_back()?;
    Some((first.as_str(), last.as_str()))
}
