//! # Permitstream Store
//!
//! Dated snapshot persistence for the permitstream acquisition pipeline.
//!
//! A snapshot is the record set for one `(source_id, day)` pair. The store
//! is deliberately small: the pipeline only needs `get`, `put`,
//! `list_days`, and `list_all_days`, plus a most-recent-available read for
//! downstream consumers. Two implementations are provided:
//!
//! | Implementation | Use |
//! |----------------|-----|
//! | [`FsSnapshotStore`] | Production; one CSV file per `(source_id, day)` |
//! | [`MemorySnapshotStore`] | Deterministic tests |
//!
//! Snapshots are append-only by day: a new day produces a new file and a
//! prior day's file is never rewritten. Re-running the same day replaces
//! that day's snapshot (last writer wins, accepted limitation).

pub mod error;
pub mod fs;
pub mod memory;
pub mod models;

use time::Date;

pub use error::StoreError;
pub use fs::FsSnapshotStore;
pub use memory::MemorySnapshotStore;
pub use models::{format_day, parse_day, PermitRecord, SNAPSHOT_COLUMNS};

/// Snapshot persistence contract.
///
/// Keyed by `(source_id, day)`. Implementations must be `Send + Sync`;
/// the orchestrator is the sole writer, everything else reads.
pub trait SnapshotStore: Send + Sync {
    /// Returns the records persisted for `(source_id, day)`, or `None` if
    /// no snapshot exists for that day.
    fn get(&self, source_id: &str, day: Date) -> Result<Option<Vec<PermitRecord>>, StoreError>;

    /// Persists `records` as the snapshot for `(source_id, day)`,
    /// replacing any snapshot already present for that exact day.
    fn put(&self, source_id: &str, day: Date, records: &[PermitRecord]) -> Result<(), StoreError>;

    /// Days with a persisted snapshot for `source_id`, most recent first.
    fn list_days(&self, source_id: &str) -> Result<Vec<Date>, StoreError>;

    /// Every `(source_id, day)` pair in the store, grouped by source.
    fn list_all_days(&self) -> Result<Vec<(String, Vec<Date>)>, StoreError>;

    /// Most-recent-available read used by downstream lead consumers:
    /// the newest snapshot for `source_id`, with the day it belongs to.
    fn latest(&self, source_id: &str) -> Result<Option<(Date, Vec<PermitRecord>)>, StoreError> {
        for day in self.list_days(source_id)? {
            if let Some(records) = self.get(source_id, day)? {
                return Ok(Some((day, records)));
            }
        }
        Ok(None)
    }
}
