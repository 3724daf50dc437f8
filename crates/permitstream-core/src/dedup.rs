//! Per-run duplicate suppression.

use std::collections::HashSet;

use time::Date;

use permitstream_store::{format_day, PermitRecord};

const ADDRESS_PREFIX_LEN: usize = 50;

/// Deduplicates records within a single acquisition run.
///
/// The identity key is `source_id:permit_number`. When the upstream source
/// has no permit number, a synthetic key is derived from the source, a
/// lowercased address prefix, and the run day, so repeated rows from
/// overlapping pages still collapse.
#[derive(Debug, Default)]
pub struct DedupFilter {
    seen: HashSet<String>,
}

impl DedupFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits `record` if its key has not been seen this run.
    pub fn admit(&mut self, record: &PermitRecord, day: Date) -> bool {
        self.seen.insert(Self::key(record, day))
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    fn key(record: &PermitRecord, day: Date) -> String {
        if record.permit_number.is_empty() {
            let prefix: String = record
                .address
                .chars()
                .take(ADDRESS_PREFIX_LEN)
                .collect::<String>()
                .to_lowercase();
            format!("{}:{}:{}", record.source_id, prefix, format_day(day))
        } else {
            format!("{}:{}", record.source_id, record.permit_number)
        }
    }
}
