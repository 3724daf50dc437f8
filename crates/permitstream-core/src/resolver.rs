//! Tiered fallback resolution for sources whose live fetch produced nothing.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::Date;
use tracing::{info, warn};

use permitstream_store::{PermitRecord, SnapshotStore};

use crate::sample::SampleRegistry;

/// Provenance tier of a resolved snapshot, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Fresh records fetched this run.
    Live,
    /// The most recent prior day's snapshot, re-labeled for today.
    CarriedForward,
    /// Any readable snapshot found by scanning the source's history.
    Historical,
    /// Deterministic placeholder records from a registered generator.
    Synthetic,
    /// Nothing available at any tier.
    Empty,
}

impl Tier {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::CarriedForward => "carried_forward",
            Self::Historical => "historical",
            Self::Synthetic => "synthetic",
            Self::Empty => "empty",
        }
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a fallback resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub tier: Tier,
    pub records: Vec<PermitRecord>,
}

/// Walks the fallback tiers for a dark source.
///
/// The resolver only reads; persisting whatever it returns is the
/// orchestrator's job. Unreadable snapshots are skipped, not fatal: a
/// corrupt day must never mask an older good one.
pub struct FallbackResolver {
    store: Arc<dyn SnapshotStore>,
    samples: SampleRegistry,
}

impl FallbackResolver {
    pub fn new(store: Arc<dyn SnapshotStore>, samples: SampleRegistry) -> Self {
        Self { store, samples }
    }

    /// Resolves the best available non-live snapshot for `(source_id, day)`.
    pub fn resolve(&self, source_id: &str, day: Date) -> Resolution {
        if let Some(records) = self.carried_forward(source_id, day) {
            info!(source_id, count = records.len(), "resolved via carry-forward");
            return Resolution {
                tier: Tier::CarriedForward,
                records,
            };
        }
        if let Some(records) = self.historical_scan(source_id, day) {
            info!(source_id, count = records.len(), "resolved via historical scan");
            return Resolution {
                tier: Tier::Historical,
                records,
            };
        }
        if let Some(generator) = self.samples.get(source_id) {
            let records = generator.generate(source_id, day);
            info!(source_id, count = records.len(), "resolved via placeholder generator");
            return Resolution {
                tier: Tier::Synthetic,
                records,
            };
        }

        info!(source_id, "no fallback available, resolving empty");
        Resolution {
            tier: Tier::Empty,
            records: Vec::new(),
        }
    }

    /// The single most recent prior day, if readable and non-empty.
    fn carried_forward(&self, source_id: &str, day: Date) -> Option<Vec<PermitRecord>> {
        let days = self.list_days_or_empty(source_id);
        let prior = days.into_iter().find(|d| *d < day)?;
        match self.store.get(source_id, prior) {
            Ok(Some(records)) if !records.is_empty() => Some(records),
            Ok(_) => None,
            Err(error) => {
                warn!(source_id, %error, "carry-forward snapshot unreadable");
                None
            }
        }
    }

    /// Any readable non-empty snapshot, newest first, the run day included.
    fn historical_scan(&self, source_id: &str, day: Date) -> Option<Vec<PermitRecord>> {
        for candidate in self.list_days_or_empty(source_id) {
            if candidate == day {
                // The run day's own snapshot is what we are trying to build.
                continue;
            }
            match self.store.get(source_id, candidate) {
                Ok(Some(records)) if !records.is_empty() => return Some(records),
                Ok(_) => {}
                Err(error) => {
                    warn!(source_id, %error, "skipping unreadable snapshot");
                }
            }
        }
        None
    }

    fn list_days_or_empty(&self, source_id: &str) -> Vec<Date> {
        match self.store.list_days(source_id) {
            Ok(days) => days,
            Err(error) => {
                warn!(source_id, %error, "could not list snapshot days");
                Vec::new()
            }
        }
    }
}
