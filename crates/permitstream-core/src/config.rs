//! Pipeline configuration with environment overrides.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::adapter::FetchConstraints;

const ENV_DATA_DIR: &str = "PERMITSTREAM_DATA_DIR";
const ENV_MAX_RECORDS: &str = "PERMITSTREAM_MAX_RECORDS";
const ENV_LOOKBACK_DAYS: &str = "PERMITSTREAM_LOOKBACK_DAYS";
const ENV_JITTER_SECS: &str = "PERMITSTREAM_JITTER_SECS";

/// Process-level pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Root directory of the snapshot store.
    pub data_dir: PathBuf,
    /// Per-source fetch bounds.
    pub constraints: FetchConstraints,
    /// Upper bound of the random start delay applied to each run.
    pub max_jitter: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            constraints: FetchConstraints::default(),
            max_jitter: Duration::from_secs(30 * 60),
        }
    }
}

impl PipelineConfig {
    /// Defaults overlaid with `PERMITSTREAM_*` environment variables.
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            if !dir.is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }
        if let Some(max_records) = parse_env(ENV_MAX_RECORDS) {
            config.constraints.max_records = max_records;
        }
        if let Some(lookback_days) = parse_env(ENV_LOOKBACK_DAYS) {
            config.constraints.lookback_days = lookback_days;
        }
        if let Some(jitter_secs) = parse_env::<u64>(ENV_JITTER_SECS) {
            config.max_jitter = Duration::from_secs(jitter_secs);
        }
        config
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(name, raw, "ignoring unparseable environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_contract() {
        let config = PipelineConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.constraints.max_records, 5_000);
        assert_eq!(config.constraints.lookback_days, 90);
        assert_eq!(config.max_jitter, Duration::from_secs(1_800));
    }
}
