//! Shared paging discipline for batch-oriented upstream queries.

use std::future::Future;

use permitstream_store::PermitRecord;
use tracing::warn;

use crate::adapter::FetchConstraints;
use crate::error::FetchError;
use crate::retry::{run_with_retry, RetryPolicy};

use super::{Pacing, BATCH_SIZE, MAX_CONSECUTIVE_BATCH_FAILURES};

/// One fetched page, before the pager decides whether to continue.
#[derive(Debug)]
pub struct Page {
    /// Normalized records that survived per-record parsing.
    pub records: Vec<PermitRecord>,
    /// Raw row count reported by the upstream for this page. A page with
    /// fewer raw rows than requested marks the end of the result set.
    pub raw_count: usize,
}

/// Pages through an upstream query until the constraint maximum is hit,
/// the upstream runs dry, or three consecutive batch failures occur.
///
/// Each batch is retried via `policy` before counting as a failure. After
/// the failure limit, whatever was accumulated is returned as a partial
/// result. A permanent error also ends the fetch: with records in hand it
/// degrades to a partial result, with nothing fetched yet it propagates.
pub async fn fetch_paged<F, Fut>(
    source_id: &str,
    constraints: FetchConstraints,
    policy: &RetryPolicy,
    pacing: Pacing,
    mut fetch_page: F,
) -> Result<Vec<PermitRecord>, FetchError>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Page, FetchError>>,
{
    let mut records: Vec<PermitRecord> = Vec::new();
    let mut offset = 0usize;
    let mut consecutive_failures = 0u32;

    while records.len() < constraints.max_records {
        let limit = BATCH_SIZE.min(constraints.max_records - records.len());

        match run_with_retry(policy, || fetch_page(offset, limit)).await {
            Ok(page) => {
                consecutive_failures = 0;
                let raw_count = page.raw_count;
                records.extend(page.records);
                if raw_count < limit {
                    break;
                }
                offset += raw_count;
                if !pacing.inter_batch.is_zero() {
                    tokio::time::sleep(pacing.inter_batch).await;
                }
            }
            Err(error) if error.retryable() => {
                consecutive_failures += 1;
                warn!(
                    source_id,
                    offset,
                    consecutive_failures,
                    error = %error,
                    "batch failed after retries"
                );
                if consecutive_failures >= MAX_CONSECUTIVE_BATCH_FAILURES {
                    warn!(
                        source_id,
                        fetched = records.len(),
                        "aborting fetch after consecutive batch failures, returning partial result"
                    );
                    break;
                }
                if !pacing.after_error.is_zero() {
                    tokio::time::sleep(pacing.after_error).await;
                }
            }
            Err(error) => {
                // Retrying later pages of a rejected query is pointless.
                if records.is_empty() {
                    return Err(error);
                }
                warn!(
                    source_id,
                    offset,
                    fetched = records.len(),
                    error = %error,
                    "permanent batch failure, returning partial result"
                );
                break;
            }
        }
    }

    records.truncate(constraints.max_records);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use time::OffsetDateTime;

    fn record(n: usize) -> PermitRecord {
        PermitRecord {
            source_id: String::from("testville"),
            permit_number: format!("P-{n}"),
            address: format!("{n} Main St"),
            permit_type: String::from("REMODEL"),
            estimated_value: None,
            issue_date: None,
            status: None,
            scraped_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn full_page(offset: usize, limit: usize) -> Page {
        Page {
            records: (offset..offset + limit).map(record).collect(),
            raw_count: limit,
        }
    }

    #[tokio::test]
    async fn stops_at_max_records() {
        let constraints = FetchConstraints {
            max_records: 2_500,
            lookback_days: 90,
        };
        let records = fetch_paged(
            "testville",
            constraints,
            &RetryPolicy::immediate(),
            Pacing::none(),
            |offset, limit| async move { Ok(full_page(offset, limit)) },
        )
        .await
        .expect("fetch succeeds");

        assert_eq!(records.len(), 2_500);
        assert_eq!(records[2_499].permit_number, "P-2499");
    }

    #[tokio::test]
    async fn short_page_ends_the_fetch() {
        let records = fetch_paged(
            "testville",
            FetchConstraints::default(),
            &RetryPolicy::immediate(),
            Pacing::none(),
            |offset, _limit| async move {
                Ok(Page {
                    records: (offset..offset + 7).map(record).collect(),
                    raw_count: 7,
                })
            },
        )
        .await
        .expect("fetch succeeds");

        assert_eq!(records.len(), 7);
    }

    #[tokio::test]
    async fn three_consecutive_failures_return_partial_result() {
        let calls = AtomicU32::new(0);
        let records = fetch_paged(
            "testville",
            FetchConstraints::default(),
            &RetryPolicy::immediate(),
            Pacing::none(),
            |offset, limit| {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if call == 0 {
                        Ok(full_page(offset, limit))
                    } else {
                        Err(FetchError::timeout("upstream stalled"))
                    }
                }
            },
        )
        .await
        .expect("partial result, not an error");

        assert_eq!(records.len(), BATCH_SIZE);
        // 1 good page + 3 failed batches, each retried 3 times.
        assert_eq!(calls.load(Ordering::SeqCst), 1 + 3 * 3);
    }

    #[tokio::test]
    async fn permanent_failure_with_nothing_fetched_is_an_error() {
        let result = fetch_paged(
            "testville",
            FetchConstraints::default(),
            &RetryPolicy::immediate(),
            Pacing::none(),
            |_, _| async { Err(FetchError::invalid_request("bad where clause")) },
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn permanent_failure_after_progress_degrades_to_partial() {
        let calls = AtomicU32::new(0);
        let records = fetch_paged(
            "testville",
            FetchConstraints::default(),
            &RetryPolicy::immediate(),
            Pacing::none(),
            |offset, limit| {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if call == 0 {
                        Ok(full_page(offset, limit))
                    } else {
                        Err(FetchError::malformed_payload("not json"))
                    }
                }
            },
        )
        .await
        .expect("partial result");

        assert_eq!(records.len(), BATCH_SIZE);
    }
}
