use std::fs;
use std::path::{Path, PathBuf};

use time::Date;
use tracing::debug;

use crate::error::StoreError;
use crate::models::{format_day, parse_day, PermitRecord, SnapshotRow};
use crate::SnapshotStore;

/// Filesystem snapshot store.
///
/// Layout mirrors one directory per source with one dated folder per day:
///
/// ```text
/// <root>/<source_id>/<YYYY-MM-DD>/<YYYY-MM-DD>_<source_id>.csv
/// ```
///
/// Writing a day that already exists replaces that day's file only; prior
/// days are never touched.
#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    root: PathBuf,
}

impl FsSnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn snapshot_path(&self, source_id: &str, day: Date) -> PathBuf {
        let day = format_day(day);
        self.root
            .join(source_id)
            .join(&day)
            .join(format!("{day}_{source_id}.csv"))
    }

    fn check_source_id(source_id: &str) -> Result<(), StoreError> {
        let valid = !source_id.is_empty()
            && source_id
                .chars()
                .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_');
        if valid {
            Ok(())
        } else {
            Err(StoreError::InvalidSourceId(source_id.to_owned()))
        }
    }

    fn day_dirs(&self, source_dir: &Path) -> Result<Vec<Date>, StoreError> {
        let mut days = Vec::new();
        let entries = match fs::read_dir(source_dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(days),
            Err(error) => return Err(StoreError::io(source_dir, error)),
        };

        for entry in entries {
            let entry = entry.map_err(|error| StoreError::io(source_dir, error))?;
            if !entry.path().is_dir() {
                continue;
            }
            // Non-date directories are ignored rather than treated as corruption.
            if let Ok(day) = parse_day(&entry.file_name().to_string_lossy()) {
                days.push(day);
            }
        }

        days.sort_unstable_by(|a, b| b.cmp(a));
        Ok(days)
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn get(&self, source_id: &str, day: Date) -> Result<Option<Vec<PermitRecord>>, StoreError> {
        Self::check_source_id(source_id)?;
        let path = self.snapshot_path(source_id, day);
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&path)
            .map_err(|error| StoreError::format(&path, error))?;
        let mut records = Vec::new();
        for row in reader.deserialize::<SnapshotRow>() {
            let row = row.map_err(|error| StoreError::format(&path, error))?;
            records.push(row.into_record(source_id, day));
        }
        Ok(Some(records))
    }

    fn put(&self, source_id: &str, day: Date, records: &[PermitRecord]) -> Result<(), StoreError> {
        Self::check_source_id(source_id)?;
        let path = self.snapshot_path(source_id, day);
        let parent = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent).map_err(|error| StoreError::io(parent, error))?;

        let mut writer = csv::Writer::from_path(&path)
            .map_err(|error| StoreError::format(&path, error))?;
        for record in records {
            writer
                .serialize(SnapshotRow::from_record(record))
                .map_err(|error| StoreError::format(&path, error))?;
        }
        writer
            .flush()
            .map_err(|error| StoreError::io(&path, error))?;

        debug!(source_id, day = %format_day(day), rows = records.len(), "snapshot written");
        Ok(())
    }

    fn list_days(&self, source_id: &str) -> Result<Vec<Date>, StoreError> {
        Self::check_source_id(source_id)?;
        self.day_dirs(&self.root.join(source_id))
    }

    fn list_all_days(&self) -> Result<Vec<(String, Vec<Date>)>, StoreError> {
        let mut sources = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(sources),
            Err(error) => return Err(StoreError::io(&self.root, error)),
        };

        for entry in entries {
            let entry = entry.map_err(|error| StoreError::io(&self.root, error))?;
            if !entry.path().is_dir() {
                continue;
            }
            let source_id = entry.file_name().to_string_lossy().into_owned();
            if Self::check_source_id(&source_id).is_err() {
                continue;
            }
            let days = self.day_dirs(&entry.path())?;
            sources.push((source_id, days));
        }

        sources.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(sources)
    }
}
