mod resolve;
mod run;
mod snapshots;
mod sources;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use time::{Date, OffsetDateTime};

use permitstream_core::{parse_day, FsSnapshotStore, PipelineConfig};

use crate::cli::{Cli, Command, OutputFormat};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::Run(args) => run::run(cli, args).await,
        Command::Resolve(args) => resolve::run(cli, args),
        Command::Sources => sources::run(cli),
        Command::Snapshots(args) => snapshots::run(cli, args),
    }
}

/// Pipeline config with the CLI data-dir override applied.
fn config_for(cli: &Cli) -> PipelineConfig {
    let mut config = PipelineConfig::from_env();
    if let Some(dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(dir);
    }
    config
}

fn store_for(cli: &Cli) -> Arc<FsSnapshotStore> {
    Arc::new(FsSnapshotStore::new(config_for(cli).data_dir))
}

/// Parses an optional `--day` argument, defaulting to today (UTC).
fn day_or_today(raw: Option<&str>) -> Result<Date, CliError> {
    match raw {
        Some(text) => Ok(parse_day(text)?),
        None => Ok(OffsetDateTime::now_utc().date()),
    }
}

/// Emits `value` as JSON on stdout, honoring `--pretty`.
fn render_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}

fn wants_json(cli: &Cli) -> bool {
    cli.format == OutputFormat::Json
}
