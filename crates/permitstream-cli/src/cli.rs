//! CLI argument definitions for Permitstream.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `run` | Execute one acquisition run across all sources |
//! | `resolve` | Preview the fallback tier a source would resolve to |
//! | `sources` | List the built-in source catalog |
//! | `snapshots` | List persisted snapshot days |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `text` | Output format (text, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--data-dir` | env/`data` | Snapshot store root |

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Resilient construction-permit acquisition pipeline.
///
/// Fetches building permits from municipal open-data portals, with
/// per-source retry, fallback tiers, and dated CSV snapshots.
#[derive(Debug, Parser)]
#[command(
    name = "permitstream",
    author,
    version,
    about = "Multi-source construction-permit acquisition pipeline"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Snapshot store root; overrides PERMITSTREAM_DATA_DIR.
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Single JSON object output.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Execute one acquisition run across all sources.
    Run(RunArgs),
    /// Preview which fallback tier a source would resolve to, without
    /// fetching or writing anything.
    Resolve(ResolveArgs),
    /// List the built-in source catalog.
    Sources,
    /// List persisted snapshot days.
    Snapshots(SnapshotsArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Day label for the produced snapshots (YYYY-MM-DD, default today).
    #[arg(long)]
    pub day: Option<String>,

    /// Skip the random start delay.
    #[arg(long, default_value_t = false)]
    pub no_jitter: bool,

    /// Per-source record cap; overrides PERMITSTREAM_MAX_RECORDS.
    #[arg(long)]
    pub max_records: Option<usize>,

    /// Upstream lookback window in days; overrides PERMITSTREAM_LOOKBACK_DAYS.
    #[arg(long)]
    pub lookback_days: Option<u32>,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Source to resolve.
    pub source: String,

    /// Day to resolve for (YYYY-MM-DD, default today).
    #[arg(long)]
    pub day: Option<String>,
}

#[derive(Debug, Args)]
pub struct SnapshotsArgs {
    /// Restrict the listing to one source.
    #[arg(long)]
    pub source: Option<String>,
}
