//! Synthetic placeholder generation, the last fallback tier.
//!
//! Placeholder records exist so downstream consumers see a plausible
//! snapshot shape while a source is dark. Generation is deterministic per
//! `(source_id, day)`: re-resolving the same day yields the same records.
//! Sources without a registered generator get nothing; an empty snapshot
//! is preferable to fabricating leads for jurisdictions that opted out.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use time::{Date, Duration};

use permitstream_store::PermitRecord;

/// Prefix marking synthetic permit numbers.
pub const SAMPLE_PREFIX: &str = "SAMPLE";

/// Fixed address pool for one source's placeholder records.
#[derive(Debug, Clone)]
pub struct SampleGenerator {
    /// City and state appended to each address, e.g. `"Nashville, TN"`.
    region_label: &'static str,
    addresses: &'static [&'static str],
    permit_types: &'static [&'static str],
}

const SAMPLE_TYPES: &[&str] = &["NEW CONSTRUCTION", "REMODEL", "ADDITION", "REPAIR"];

impl SampleGenerator {
    pub fn new(region_label: &'static str, addresses: &'static [&'static str]) -> Self {
        Self {
            region_label,
            addresses,
            permit_types: SAMPLE_TYPES,
        }
    }

    /// Fixed number of records this generator produces.
    pub fn record_count(&self) -> usize {
        self.addresses.len()
    }

    /// Generates the placeholder snapshot for `(source_id, day)`.
    pub fn generate(&self, source_id: &str, day: Date) -> Vec<PermitRecord> {
        let mut rng = fastrand::Rng::with_seed(seed_for(source_id, day));
        let prefix: String = source_id
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(3)
            .collect::<String>()
            .to_uppercase();

        self.addresses
            .iter()
            .enumerate()
            .map(|(i, street)| {
                let value = rng.u32(50_000..=500_000);
                let days_back = i64::from(rng.u32(1..=30));
                let issue_date = day.checked_sub(Duration::days(days_back)).unwrap_or(day);

                PermitRecord {
                    source_id: source_id.to_owned(),
                    permit_number: format!("{SAMPLE_PREFIX}-{prefix}{:03}", i + 1),
                    address: format!("{street}, {}", self.region_label),
                    permit_type: self.permit_types[i % self.permit_types.len()].to_owned(),
                    estimated_value: Some(f64::from(value)),
                    issue_date: Some(issue_date),
                    status: None,
                    scraped_at: day.midnight().assume_utc(),
                }
            })
            .collect()
    }
}

fn seed_for(source_id: &str, day: Date) -> u64 {
    let mut hasher = DefaultHasher::new();
    source_id.hash(&mut hasher);
    day.hash(&mut hasher);
    hasher.finish()
}

/// Per-source generator registry consulted by the fallback resolver.
#[derive(Debug, Default)]
pub struct SampleRegistry {
    generators: HashMap<String, SampleGenerator>,
}

impl SampleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry covering the built-in catalog. Sources absent here are
    /// real-data-only by policy.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(
            "nashville",
            SampleGenerator::new(
                "Nashville, TN",
                &["123 Main St", "456 Oak Ave", "789 Broadway", "321 Church St", "654 Woodland St"],
            ),
        );
        registry.register(
            "chattanooga",
            SampleGenerator::new(
                "Chattanooga, TN",
                &["100 Market St", "200 River Rd", "300 Mountain Ave", "400 Valley Dr", "500 Lake St"],
            ),
        );
        registry.register(
            "austin",
            SampleGenerator::new(
                "Austin, TX",
                &["601 Congress Ave", "702 6th St", "803 Barton Springs", "904 South Congress", "1005 Rainey St"],
            ),
        );
        registry.register(
            "houston",
            SampleGenerator::new(
                "Houston, TX",
                &["1601 Texas St", "1702 Main St", "1803 Post Oak", "1904 Westheimer", "2005 Montrose"],
            ),
        );
        registry.register(
            "charlotte",
            SampleGenerator::new(
                "Charlotte, NC",
                &["2101 Trade St", "2202 Tryon St", "2303 South Blvd", "2404 Providence Rd", "2505 Kings Dr"],
            ),
        );
        registry.register(
            "phoenix",
            SampleGenerator::new(
                "Phoenix, AZ",
                &["2601 Camelback Rd", "2702 Central Ave", "2803 Mill Ave", "2904 Scottsdale Rd", "3005 Biltmore"],
            ),
        );
        registry
    }

    pub fn register(&mut self, source_id: impl Into<String>, generator: SampleGenerator) {
        self.generators.insert(source_id.into(), generator);
    }

    pub fn get(&self, source_id: &str) -> Option<&SampleGenerator> {
        self.generators.get(source_id)
    }
}
