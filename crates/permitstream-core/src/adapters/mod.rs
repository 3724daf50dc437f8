//! Built-in source adapters.
//!
//! Two upstream families cover the catalog: ArcGIS feature services
//! ([`arcgis`]) and Socrata open-data resources ([`socrata`]). Both share
//! the same paging discipline, implemented once in [`pager`]; the family
//! modules only differ in query construction and payload shape.

pub mod arcgis;
pub mod catalog;
pub mod pager;
pub mod socrata;

use std::time::Duration;

/// Records requested per page.
pub const BATCH_SIZE: usize = 1_000;

/// Consecutive batch failures tolerated before aborting a fetch.
pub const MAX_CONSECUTIVE_BATCH_FAILURES: u32 = 3;

/// Fixed pauses between upstream requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Pause after a successful batch.
    pub inter_batch: Duration,
    /// Pause after a failed batch, before the next one.
    pub after_error: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            inter_batch: Duration::from_millis(500),
            after_error: Duration::from_secs(2),
        }
    }
}

impl Pacing {
    /// No pauses, for tests.
    pub const fn none() -> Self {
        Self {
            inter_batch: Duration::ZERO,
            after_error: Duration::ZERO,
        }
    }
}
