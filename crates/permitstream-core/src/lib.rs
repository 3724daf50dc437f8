//! # Permitstream Core
//!
//! Resilient multi-source acquisition of public construction-permit
//! records. The pipeline fetches from municipal open-data portals,
//! validates and deduplicates what it gets, and guarantees that every
//! scheduled run leaves a snapshot behind for every source, degrading
//! through fallback tiers when a portal is dark.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`adapter`] | Source adapter contract and fetch constraints |
//! | [`adapters`] | Built-in ArcGIS and Socrata adapters plus the catalog |
//! | [`retry`] | Exponential backoff around batch requests |
//! | [`region`] | Address plausibility guard |
//! | [`dedup`] | Per-run duplicate suppression |
//! | [`resolver`] | Tiered fallback when a live fetch yields nothing |
//! | [`sample`] | Deterministic placeholder generation |
//! | [`orchestrator`] | Sequential run loop with cancellation |
//! | [`health`] | Advisory per-source health telemetry |
//! | [`config`] | Pipeline settings with environment overrides |
//!
//! Persistence lives in `permitstream-store`; its key types are
//! re-exported here so most consumers only depend on this crate.

pub mod adapter;
pub mod adapters;
pub mod config;
pub mod dedup;
pub mod error;
pub mod health;
pub mod http;
pub mod normalize;
pub mod orchestrator;
pub mod region;
pub mod resolver;
pub mod retry;
pub mod sample;
pub mod source;

pub use adapter::{FetchConstraints, SourceAdapter};
pub use adapters::catalog::{builtin_adapters, builtin_source_ids};
pub use adapters::Pacing;
pub use config::PipelineConfig;
pub use dedup::DedupFilter;
pub use error::{FetchError, FetchErrorKind};
pub use health::{HealthRecorder, SourceHealth};
pub use http::{HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient};
pub use orchestrator::{CancelToken, RunOrchestrator, RunSummary, SourceOutcome, TierCounts};
pub use region::{RegionGuard, RegionRule};
pub use resolver::{FallbackResolver, Resolution, Tier};
pub use retry::{run_with_retry, RetryPolicy};
pub use sample::{SampleGenerator, SampleRegistry};
pub use source::SourceId;

pub use permitstream_store::{
    format_day, parse_day, FsSnapshotStore, MemorySnapshotStore, PermitRecord, SnapshotStore,
    StoreError,
};
