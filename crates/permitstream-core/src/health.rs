//! Advisory source health tracking.
//!
//! Health is recorded, never consulted for control flow: a source that
//! failed yesterday is still attempted today. The snapshot feeds the CLI
//! `sources` view and log output.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::info;

/// Health record for one source.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceHealth {
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_success_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_failure_at: Option<OffsetDateTime>,
    pub last_failure_reason: Option<String>,
    pub consecutive_failures: u32,
    /// Records dropped by the region guard across the lifetime of this
    /// recorder.
    pub filtered_records: u64,
}

/// Thread-safe recorder shared by the orchestrator and adapters.
#[derive(Debug, Default)]
pub struct HealthRecorder {
    sources: Mutex<HashMap<String, SourceHealth>>,
}

impl HealthRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, source_id: &str, record_count: usize) {
        let mut sources = self.sources.lock().expect("health lock poisoned");
        let health = sources.entry(source_id.to_owned()).or_default();
        health.last_success_at = Some(OffsetDateTime::now_utc());
        health.consecutive_failures = 0;
        info!(source_id, record_count, "source fetch succeeded");
    }

    pub fn record_failure(&self, source_id: &str, reason: &str) {
        let mut sources = self.sources.lock().expect("health lock poisoned");
        let health = sources.entry(source_id.to_owned()).or_default();
        health.last_failure_at = Some(OffsetDateTime::now_utc());
        health.last_failure_reason = Some(reason.to_owned());
        health.consecutive_failures += 1;
        info!(
            source_id,
            reason,
            consecutive_failures = health.consecutive_failures,
            "source fetch failed"
        );
    }

    pub fn record_filtered(&self, source_id: &str, dropped: usize) {
        if dropped == 0 {
            return;
        }
        let mut sources = self.sources.lock().expect("health lock poisoned");
        let health = sources.entry(source_id.to_owned()).or_default();
        health.filtered_records += dropped as u64;
        info!(source_id, dropped, "records dropped by region guard");
    }

    /// Current health per source, sorted by source id.
    pub fn snapshot(&self) -> Vec<(String, SourceHealth)> {
        let sources = self.sources.lock().expect("health lock poisoned");
        let mut entries: Vec<(String, SourceHealth)> = sources
            .iter()
            .map(|(id, health)| (id.clone(), health.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_resets_consecutive_failures() {
        let recorder = HealthRecorder::new();
        recorder.record_failure("phoenix", "timeout");
        recorder.record_failure("phoenix", "timeout");
        recorder.record_success("phoenix", 12);

        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.len(), 1);
        let (id, health) = &snapshot[0];
        assert_eq!(id, "phoenix");
        assert_eq!(health.consecutive_failures, 0);
        assert!(health.last_success_at.is_some());
        assert_eq!(health.last_failure_reason.as_deref(), Some("timeout"));
    }

    #[test]
    fn failures_accumulate_per_source() {
        let recorder = HealthRecorder::new();
        recorder.record_failure("austin", "503");
        recorder.record_failure("austin", "503");
        recorder.record_filtered("austin", 3);
        recorder.record_filtered("austin", 0);

        let snapshot = recorder.snapshot();
        let health = &snapshot[0].1;
        assert_eq!(health.consecutive_failures, 2);
        assert_eq!(health.filtered_records, 3);
    }
}
