use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use permitstream_core::{
    builtin_adapters, CancelToken, FallbackResolver, HealthRecorder, Pacing, RegionGuard,
    ReqwestHttpClient, RetryPolicy, RunOrchestrator, RunSummary, SampleRegistry, SnapshotStore,
};

use crate::cli::{Cli, RunArgs};
use crate::error::CliError;

use super::{config_for, day_or_today, render_json, store_for, wants_json};

pub async fn run(cli: &Cli, args: &RunArgs) -> Result<(), CliError> {
    let mut config = config_for(cli);
    if let Some(max_records) = args.max_records {
        config.constraints.max_records = max_records;
    }
    if let Some(lookback_days) = args.lookback_days {
        config.constraints.lookback_days = lookback_days;
    }
    if args.no_jitter {
        config.max_jitter = Duration::ZERO;
    }
    let day = day_or_today(args.day.as_deref())?;

    let store: Arc<dyn SnapshotStore> = store_for(cli);
    let adapters = builtin_adapters(
        Arc::new(ReqwestHttpClient::new()),
        RetryPolicy::default(),
        Pacing::default(),
    );
    let orchestrator = RunOrchestrator::new(
        adapters,
        store.clone(),
        FallbackResolver::new(store, SampleRegistry::builtin()),
        RegionGuard::builtin(),
        Arc::new(HealthRecorder::new()),
        config.constraints,
        config.max_jitter,
    );

    let token = CancelToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, finishing the current source");
            signal_token.cancel();
        }
    });

    let summary = orchestrator.run(day, &token).await;

    if wants_json(cli) {
        render_json(&summary, cli.pretty)?;
    } else {
        render_text(&summary);
    }

    if summary.succeeded() {
        Ok(())
    } else {
        Err(CliError::RunProducedNothing)
    }
}

fn render_text(summary: &RunSummary) {
    println!("run {} for {}", summary.run_id, summary.day);
    for outcome in &summary.outcomes {
        let note = outcome
            .note
            .as_deref()
            .map(|n| format!(" ({n})"))
            .unwrap_or_default();
        println!(
            "  {:<16} {:<16} {:>6} records{note}",
            outcome.source_id,
            outcome.tier.as_str(),
            outcome.record_count,
        );
    }
    let counts = summary.tier_counts();
    println!(
        "tiers: live={} carried_forward={} historical={} synthetic={} empty={}",
        counts.live, counts.carried_forward, counts.historical, counts.synthetic, counts.empty
    );
    if summary.cancelled {
        println!("run was cancelled before completing all sources");
    }
}
