use std::future::Future;
use std::pin::Pin;

use permitstream_store::PermitRecord;

use crate::error::FetchError;
use crate::source::SourceId;

/// Bounds applied to a single source fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchConstraints {
    /// Upper bound on records returned by one fetch.
    pub max_records: usize,
    /// How far back the upstream query reaches, in days.
    pub lookback_days: u32,
}

impl Default for FetchConstraints {
    fn default() -> Self {
        Self {
            max_records: 5_000,
            lookback_days: 90,
        }
    }
}

/// Source adapter contract.
///
/// An adapter owns everything source-specific: endpoint, query shape,
/// paging, and field normalization. It pages in fixed-size batches until
/// the constraint maximum is reached, the upstream runs dry, or three
/// consecutive batch failures occur; in the last case it returns whatever
/// it already accumulated rather than an error.
///
/// Implementations must be `Send + Sync`; the orchestrator shares them
/// across runs.
pub trait SourceAdapter: Send + Sync {
    /// Unique source identifier, doubling as the snapshot key.
    fn id(&self) -> &SourceId;

    /// Fetches and normalizes records within `constraints`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] only when nothing could be fetched at all;
    /// a fetch that degraded mid-way yields a partial `Ok`.
    fn fetch<'a>(
        &'a self,
        constraints: FetchConstraints,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<PermitRecord>, FetchError>> + Send + 'a>>;
}
