//! Structured fan-out/fan-in for concurrent fetch operations
//!
//! This module provides the concurrency primitive shared by the paged
//! fetcher and the aggregator: run a batch of fetch futures off the
//! caller's task and join every one of them before returning. Two modes
//! are offered:
//!
//! - **fail-fast** — the first failure aborts all outstanding tasks and
//!   becomes the result of the whole call
//! - **collect-all** — every task runs to completion and every result,
//!   success or failure, is returned positionally
//!
//! No spawned task outlives the call in either mode.

use std::future::Future;

use tokio::task::JoinSet;
use tracing::debug;

use crate::errors::{FetchError, FetchResult};

/// Run all tasks concurrently, aborting the batch on the first failure
///
/// Results are returned in the order the tasks were supplied, not in
/// completion order. When a task fails, its error is returned and the
/// partial successes of sibling tasks are discarded.
pub async fn run_fail_fast<T, F>(tasks: Vec<F>) -> FetchResult<Vec<T>>
where
    T: Send + 'static,
    F: Future<Output = FetchResult<T>> + Send + 'static,
{
    let total = tasks.len();
    let mut set = JoinSet::new();
    for (index, task) in tasks.into_iter().enumerate() {
        set.spawn(async move { (index, task.await) });
    }

    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(total).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, Ok(value))) => {
                slots[index] = Some(value);
            }
            Ok((index, Err(error))) => {
                debug!(index, %error, "task failed, aborting {} siblings", set.len());
                set.abort_all();
                // Join every aborted task so nothing outlives this call
                while set.join_next().await.is_some() {}
                return Err(error);
            }
            Err(join_error) => {
                set.abort_all();
                while set.join_next().await.is_some() {}
                return Err(FetchError::TaskFailed {
                    reason: join_error.to_string(),
                });
            }
        }
    }

    slots
        .into_iter()
        .map(|slot| {
            slot.ok_or_else(|| FetchError::TaskFailed {
                reason: "task completed without reporting a result".to_string(),
            })
        })
        .collect()
}

/// Run all tasks concurrently, letting every one finish
///
/// There is no cancellation in this mode. Every result is returned in
/// the order the tasks were supplied; a panicked task surfaces as
/// `FetchError::TaskFailed` in its slot.
pub async fn run_collect_all<T, F>(tasks: Vec<F>) -> Vec<FetchResult<T>>
where
    T: Send + 'static,
    F: Future<Output = FetchResult<T>> + Send + 'static,
{
    let handles: Vec<_> = tasks.into_iter().map(tokio::spawn).collect();
    let joined = futures::future::join_all(handles).await;

    joined
        .into_iter()
        .map(|result| match result {
            Ok(task_result) => task_result,
            Err(join_error) => Err(FetchError::TaskFailed {
                reason: join_error.to_string(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn ok_after(value: u32, delay: Duration) -> impl Future<Output = FetchResult<u32>> {
        async move {
            tokio::time::sleep(delay).await;
            Ok(value)
        }
    }

    fn err_after(reason: &str, delay: Duration) -> impl Future<Output = FetchResult<u32>> {
        let reason = reason.to_string();
        async move {
            tokio::time::sleep(delay).await;
            Err(FetchError::invalid_data(reason))
        }
    }

    #[tokio::test]
    async fn test_fail_fast_preserves_task_order() {
        // Later tasks complete first; results must still be positional
        let tasks = vec![
            ok_after(1, Duration::from_millis(30)),
            ok_after(2, Duration::from_millis(10)),
            ok_after(3, Duration::from_millis(20)),
        ];
        let results = run_fail_fast(tasks).await.unwrap();
        assert_eq!(results, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fail_fast_returns_first_failure() {
        let tasks: Vec<_> = vec![
            Box::pin(ok_after(1, Duration::from_millis(5)))
                as std::pin::Pin<Box<dyn Future<Output = FetchResult<u32>> + Send>>,
            Box::pin(err_after("page 3 unavailable", Duration::from_millis(10))),
            Box::pin(ok_after(4, Duration::from_millis(5))),
        ];
        let result = run_fail_fast(tasks).await;
        match result {
            Err(FetchError::InvalidData { reason }) => {
                assert_eq!(reason, "page 3 unavailable");
            }
            other => panic!("expected InvalidData, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fail_fast_cancels_slow_siblings() {
        let completed = Arc::new(AtomicUsize::new(0));
        let slow_completed = completed.clone();

        let slow = async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            slow_completed.fetch_add(1, Ordering::SeqCst);
            Ok(0u32)
        };
        let failing = err_after("boom", Duration::from_millis(5));

        let tasks: Vec<std::pin::Pin<Box<dyn Future<Output = FetchResult<u32>> + Send>>> =
            vec![Box::pin(slow), Box::pin(failing)];

        let started = std::time::Instant::now();
        let result = run_fail_fast(tasks).await;
        assert!(result.is_err());
        // The slow sibling was aborted, not waited for
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_collect_all_runs_everything() {
        let tasks: Vec<std::pin::Pin<Box<dyn Future<Output = FetchResult<u32>> + Send>>> = vec![
            Box::pin(ok_after(10, Duration::from_millis(10))),
            Box::pin(err_after("middle task failed", Duration::from_millis(1))),
            Box::pin(ok_after(30, Duration::from_millis(5))),
        ];

        let results = run_collect_all(tasks).await;
        assert_eq!(results.len(), 3);
        assert_eq!(*results[0].as_ref().unwrap(), 10);
        assert!(results[1].is_err());
        assert_eq!(*results[2].as_ref().unwrap(), 30);
    }

    #[tokio::test]
    async fn test_collect_all_empty_batch() {
        let tasks: Vec<std::pin::Pin<Box<dyn Future<Output = FetchResult<u32>> + Send>>> = vec![];
        let results = run_collect_all(tasks).await;
        assert!(results.is_empty());
    }
}
