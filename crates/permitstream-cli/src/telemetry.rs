//! Tracing setup for the CLI.

use tracing_subscriber::EnvFilter;

const ENV_LOG: &str = "PERMITSTREAM_LOG";

/// Initializes the global subscriber. Filtering comes from
/// `PERMITSTREAM_LOG`, defaulting to `info`; log lines go to stderr so
/// command output on stdout stays machine-readable.
pub fn init() {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
