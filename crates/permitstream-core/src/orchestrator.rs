//! Sequential run orchestration.
//!
//! One run walks every registered source in order: live fetch, region
//! filter, dedup, persist; any source that yields nothing falls through to
//! the fallback resolver. Sources are isolated: a total failure in one
//! never aborts the run. Cancellation is cooperative and coarse, polled
//! only between sources.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use time::Date;
use tracing::{error, info};
use uuid::Uuid;

use permitstream_store::{format_day, PermitRecord, SnapshotStore};

use crate::adapter::{FetchConstraints, SourceAdapter};
use crate::dedup::DedupFilter;
use crate::health::HealthRecorder;
use crate::region::RegionGuard;
use crate::resolver::{FallbackResolver, Tier};

/// Process-wide cooperative cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

/// Outcome of one source within a run.
#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    pub source_id: String,
    pub tier: Tier,
    pub record_count: usize,
    /// Failure or degradation detail, when any.
    pub note: Option<String>,
}

/// Per-tier source counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub live: usize,
    pub carried_forward: usize,
    pub historical: usize,
    pub synthetic: usize,
    pub empty: usize,
}

/// Summary of one orchestrated run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub day: String,
    pub outcomes: Vec<SourceOutcome>,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn tier_counts(&self) -> TierCounts {
        let mut counts = TierCounts::default();
        for outcome in &self.outcomes {
            match outcome.tier {
                Tier::Live => counts.live += 1,
                Tier::CarriedForward => counts.carried_forward += 1,
                Tier::Historical => counts.historical += 1,
                Tier::Synthetic => counts.synthetic += 1,
                Tier::Empty => counts.empty += 1,
            }
        }
        counts
    }

    /// A run succeeded if any source produced records at any tier.
    pub fn succeeded(&self) -> bool {
        self.outcomes.iter().any(|o| o.record_count > 0)
    }

    pub fn total_records(&self) -> usize {
        self.outcomes.iter().map(|o| o.record_count).sum()
    }
}

/// Drives one acquisition cycle across all registered sources.
pub struct RunOrchestrator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    store: Arc<dyn SnapshotStore>,
    resolver: FallbackResolver,
    guard: RegionGuard,
    health: Arc<HealthRecorder>,
    constraints: FetchConstraints,
    max_jitter: Duration,
}

impl RunOrchestrator {
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        store: Arc<dyn SnapshotStore>,
        resolver: FallbackResolver,
        guard: RegionGuard,
        health: Arc<HealthRecorder>,
        constraints: FetchConstraints,
        max_jitter: Duration,
    ) -> Self {
        Self {
            adapters,
            store,
            resolver,
            guard,
            health,
            constraints,
            max_jitter,
        }
    }

    pub fn health(&self) -> &HealthRecorder {
        &self.health
    }

    /// Runs every source once for `day`.
    pub async fn run(&self, day: Date, token: &CancelToken) -> RunSummary {
        // A cancel left over from a prior run must not apply to this one.
        token.reset();
        let run_id = Uuid::new_v4();
        info!(%run_id, day = %format_day(day), sources = self.adapters.len(), "run starting");

        if !self.max_jitter.is_zero() {
            let jitter = Duration::from_secs(fastrand::u64(0..=self.max_jitter.as_secs()));
            info!(%run_id, jitter_secs = jitter.as_secs(), "applying start jitter");
            tokio::time::sleep(jitter).await;
        }

        let mut outcomes = Vec::with_capacity(self.adapters.len());
        let mut dedup = DedupFilter::new();
        let mut cancelled = false;

        for adapter in &self.adapters {
            if token.is_cancelled() {
                info!(%run_id, "cancellation requested, stopping before next source");
                cancelled = true;
                break;
            }
            outcomes.push(self.run_source(adapter.as_ref(), day, &mut dedup).await);
        }

        let summary = RunSummary {
            run_id,
            day: format_day(day),
            outcomes,
            cancelled,
        };
        let counts = summary.tier_counts();
        info!(
            %run_id,
            live = counts.live,
            carried_forward = counts.carried_forward,
            historical = counts.historical,
            synthetic = counts.synthetic,
            empty = counts.empty,
            total_records = summary.total_records(),
            cancelled = summary.cancelled,
            "run finished"
        );
        summary
    }

    async fn run_source(
        &self,
        adapter: &dyn SourceAdapter,
        day: Date,
        dedup: &mut DedupFilter,
    ) -> SourceOutcome {
        let source_id = adapter.id().as_str().to_owned();

        let (live, note) = match adapter.fetch(self.constraints).await {
            Ok(records) if !records.is_empty() => {
                let fetched = records.len();
                let records = self.filter_records(&source_id, records, day, dedup);
                if records.is_empty() {
                    self.health
                        .record_failure(&source_id, "all records filtered");
                    (None, Some(format!("all {fetched} fetched records filtered")))
                } else {
                    (Some(records), None)
                }
            }
            Ok(_) => {
                self.health.record_failure(&source_id, "no records returned");
                (None, Some(String::from("live fetch returned no records")))
            }
            Err(error) => {
                self.health.record_failure(&source_id, error.message());
                (None, Some(error.to_string()))
            }
        };

        let (tier, records) = match live {
            Some(records) => {
                self.health.record_success(&source_id, records.len());
                (Tier::Live, records)
            }
            None => {
                let resolution = self.resolver.resolve(&source_id, day);
                (resolution.tier, resolution.records)
            }
        };

        if let Err(store_error) = self.store.put(&source_id, day, &records) {
            error!(source_id, %store_error, "failed to persist snapshot");
            return SourceOutcome {
                source_id,
                tier,
                record_count: 0,
                note: Some(format!("persist failed: {store_error}")),
            };
        }

        SourceOutcome {
            source_id,
            tier,
            record_count: records.len(),
            note,
        }
    }

    fn filter_records(
        &self,
        source_id: &str,
        records: Vec<PermitRecord>,
        day: Date,
        dedup: &mut DedupFilter,
    ) -> Vec<PermitRecord> {
        let fetched = records.len();
        let in_region: Vec<PermitRecord> = records
            .into_iter()
            .filter(|record| self.guard.validate(source_id, &record.address))
            .collect();
        self.health
            .record_filtered(source_id, fetched - in_region.len());

        in_region
            .into_iter()
            .filter(|record| dedup.admit(record, day))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::sample::SampleRegistry;
    use crate::source::SourceId;
    use permitstream_store::MemorySnapshotStore;
    use std::future::Future;
    use std::pin::Pin;
    use time::macros::date;
    use time::OffsetDateTime;

    /// Adapter returning a canned result on every fetch.
    struct FixedAdapter {
        id: SourceId,
        result: Result<Vec<PermitRecord>, FetchError>,
    }

    impl FixedAdapter {
        fn ok(id: &str, records: Vec<PermitRecord>) -> Arc<dyn SourceAdapter> {
            Arc::new(Self {
                id: SourceId::new(id).expect("valid id"),
                result: Ok(records),
            })
        }

        fn err(id: &str, error: FetchError) -> Arc<dyn SourceAdapter> {
            Arc::new(Self {
                id: SourceId::new(id).expect("valid id"),
                result: Err(error),
            })
        }
    }

    impl SourceAdapter for FixedAdapter {
        fn id(&self) -> &SourceId {
            &self.id
        }

        fn fetch<'a>(
            &'a self,
            _constraints: FetchConstraints,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<PermitRecord>, FetchError>> + Send + 'a>>
        {
            let result = self.result.clone();
            Box::pin(async move { result })
        }
    }

    /// Adapter that flips the cancel flag as a side effect of its fetch.
    struct CancellingAdapter {
        id: SourceId,
        records: Vec<PermitRecord>,
        token: CancelToken,
    }

    impl CancellingAdapter {
        fn new(id: &str, records: Vec<PermitRecord>, token: CancelToken) -> Arc<dyn SourceAdapter> {
            Arc::new(Self {
                id: SourceId::new(id).expect("valid id"),
                records,
                token,
            })
        }
    }

    impl SourceAdapter for CancellingAdapter {
        fn id(&self) -> &SourceId {
            &self.id
        }

        fn fetch<'a>(
            &'a self,
            _constraints: FetchConstraints,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<PermitRecord>, FetchError>> + Send + 'a>>
        {
            self.token.cancel();
            let records = self.records.clone();
            Box::pin(async move { Ok(records) })
        }
    }

    fn record(source_id: &str, permit_number: &str, address: &str) -> PermitRecord {
        PermitRecord {
            source_id: source_id.to_owned(),
            permit_number: permit_number.to_owned(),
            address: address.to_owned(),
            permit_type: String::from("REMODEL"),
            estimated_value: None,
            issue_date: None,
            status: None,
            scraped_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn orchestrator(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        store: Arc<MemorySnapshotStore>,
    ) -> RunOrchestrator {
        RunOrchestrator::new(
            adapters,
            store.clone(),
            FallbackResolver::new(store, SampleRegistry::builtin()),
            RegionGuard::builtin(),
            Arc::new(HealthRecorder::new()),
            FetchConstraints::default(),
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn live_fetch_is_deduplicated_and_persisted() {
        let store = Arc::new(MemorySnapshotStore::new());
        let day = date!(2026 - 08 - 20);
        let adapters = vec![FixedAdapter::ok(
            "nashville",
            vec![
                record("nashville", "P-100", "1 Main St, Nashville, TN"),
                record("nashville", "P-100", "1 Main St, Nashville, TN"),
                record("nashville", "P-101", "2 Oak Ave, Nashville, TN"),
            ],
        )];

        let summary = orchestrator(adapters, store.clone())
            .run(day, &CancelToken::new())
            .await;

        assert_eq!(summary.outcomes.len(), 1);
        assert_eq!(summary.outcomes[0].tier, Tier::Live);
        assert_eq!(summary.outcomes[0].record_count, 2);
        assert!(summary.succeeded());

        let persisted = store.get("nashville", day).expect("get").expect("snapshot");
        assert_eq!(persisted.len(), 2);
    }

    #[tokio::test]
    async fn failed_source_falls_back_and_run_continues() {
        let store = Arc::new(MemorySnapshotStore::new());
        let day = date!(2026 - 08 - 20);
        let adapters = vec![
            FixedAdapter::err("phoenix", FetchError::timeout("upstream dark")),
            FixedAdapter::ok(
                "austin",
                vec![record("austin", "A-1", "601 Congress Ave, Austin, TX")],
            ),
        ];

        let summary = orchestrator(adapters, store.clone())
            .run(day, &CancelToken::new())
            .await;

        assert_eq!(summary.outcomes.len(), 2);
        // Phoenix has no history but does have a generator.
        assert_eq!(summary.outcomes[0].tier, Tier::Synthetic);
        assert_eq!(summary.outcomes[0].record_count, 5);
        assert_eq!(summary.outcomes[1].tier, Tier::Live);

        let counts = summary.tier_counts();
        assert_eq!(counts.synthetic, 1);
        assert_eq!(counts.live, 1);
    }

    #[tokio::test]
    async fn out_of_region_records_are_dropped_before_persisting() {
        let store = Arc::new(MemorySnapshotStore::new());
        let day = date!(2026 - 08 - 20);
        let adapters = vec![FixedAdapter::ok(
            "phoenix",
            vec![
                record("phoenix", "PHX-1", "1365 Camelback Rd, Phoenix, AZ"),
                record("phoenix", "PHL-1", "620 S BROAD ST, Philadelphia, PA"),
            ],
        )];

        let summary = orchestrator(adapters, store.clone())
            .run(day, &CancelToken::new())
            .await;

        assert_eq!(summary.outcomes[0].record_count, 1);
        let persisted = store.get("phoenix", day).expect("get").expect("snapshot");
        assert_eq!(persisted[0].permit_number, "PHX-1");
    }

    #[tokio::test]
    async fn empty_fetch_with_history_carries_forward() {
        let store = Arc::new(MemorySnapshotStore::new());
        let day = date!(2026 - 08 - 20);
        store
            .put(
                "houston",
                date!(2026 - 08 - 19),
                &[record("houston", "H-1", "1000 Main St, Houston, TX")],
            )
            .expect("put history");
        let adapters = vec![FixedAdapter::ok("houston", Vec::new())];

        let summary = orchestrator(adapters, store.clone())
            .run(day, &CancelToken::new())
            .await;

        assert_eq!(summary.outcomes[0].tier, Tier::CarriedForward);
        let persisted = store.get("houston", day).expect("get").expect("snapshot");
        assert_eq!(persisted[0].permit_number, "H-1");
    }

    #[tokio::test]
    async fn cancellation_stops_between_sources() {
        let store = Arc::new(MemorySnapshotStore::new());
        let day = date!(2026 - 08 - 20);
        let token = CancelToken::new();
        let adapters = vec![
            CancellingAdapter::new(
                "nashville",
                vec![record("nashville", "P-1", "1 Main St, Nashville, TN")],
                token.clone(),
            ),
            FixedAdapter::ok(
                "austin",
                vec![record("austin", "A-1", "601 Congress Ave, Austin, TX")],
            ),
        ];

        let summary = orchestrator(adapters, store.clone()).run(day, &token).await;

        // The in-flight source finishes; the next one never starts.
        assert!(summary.cancelled);
        assert_eq!(summary.outcomes.len(), 1);
        assert_eq!(summary.outcomes[0].source_id, "nashville");
        assert!(store.get("austin", day).expect("get").is_none());
    }

    #[tokio::test]
    async fn run_clears_a_cancellation_left_by_a_prior_run() {
        let store = Arc::new(MemorySnapshotStore::new());
        let day = date!(2026 - 08 - 20);
        let token = CancelToken::new();
        token.cancel();
        let adapters = vec![FixedAdapter::ok(
            "nashville",
            vec![record("nashville", "P-1", "1 Main St, Nashville, TN")],
        )];

        let summary = orchestrator(adapters, store.clone()).run(day, &token).await;

        assert!(!summary.cancelled);
        assert_eq!(summary.outcomes.len(), 1);
        assert!(!token.is_cancelled());
        assert!(store.get("nashville", day).expect("get").is_some());
    }
}
