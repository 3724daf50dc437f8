use std::collections::HashMap;
use std::sync::Mutex;

use time::Date;

use crate::error::StoreError;
use crate::models::PermitRecord;
use crate::SnapshotStore;

/// In-memory snapshot store for deterministic tests.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: Mutex<HashMap<(String, Date), Vec<PermitRecord>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted `(source_id, day)` snapshots.
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.lock().expect("store lock poisoned").len()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn get(&self, source_id: &str, day: Date) -> Result<Option<Vec<PermitRecord>>, StoreError> {
        let snapshots = self.snapshots.lock().expect("store lock poisoned");
        Ok(snapshots.get(&(source_id.to_owned(), day)).cloned())
    }

    fn put(&self, source_id: &str, day: Date, records: &[PermitRecord]) -> Result<(), StoreError> {
        let mut snapshots = self.snapshots.lock().expect("store lock poisoned");
        snapshots.insert((source_id.to_owned(), day), records.to_vec());
        Ok(())
    }

    fn list_days(&self, source_id: &str) -> Result<Vec<Date>, StoreError> {
        let snapshots = self.snapshots.lock().expect("store lock poisoned");
        let mut days: Vec<Date> = snapshots
            .keys()
            .filter(|(id, _)| id == source_id)
            .map(|(_, day)| *day)
            .collect();
        days.sort_unstable_by(|a, b| b.cmp(a));
        Ok(days)
    }

    fn list_all_days(&self) -> Result<Vec<(String, Vec<Date>)>, StoreError> {
        let snapshots = self.snapshots.lock().expect("store lock poisoned");
        let mut by_source: HashMap<String, Vec<Date>> = HashMap::new();
        for (source_id, day) in snapshots.keys() {
            by_source.entry(source_id.clone()).or_default().push(*day);
        }

        let mut sources: Vec<(String, Vec<Date>)> = by_source.into_iter().collect();
        for (_, days) in sources.iter_mut() {
            days.sort_unstable_by(|a, b| b.cmp(a));
        }
        sources.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(sources)
    }
}
