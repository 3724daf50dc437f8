use serde::Serialize;

use permitstream_core::{format_day, FallbackResolver, SampleRegistry, SourceId, Tier};

use crate::cli::{Cli, ResolveArgs};
use crate::error::CliError;

use super::{day_or_today, render_json, store_for, wants_json};

#[derive(Debug, Serialize)]
struct ResolvePreview {
    source_id: String,
    day: String,
    tier: Tier,
    record_count: usize,
}

/// Dry-run resolution: shows what the fallback resolver would produce
/// for a source today, without writing anything.
pub fn run(cli: &Cli, args: &ResolveArgs) -> Result<(), CliError> {
    let source = SourceId::new(args.source.clone())?;
    let day = day_or_today(args.day.as_deref())?;
    let resolver = FallbackResolver::new(store_for(cli), SampleRegistry::builtin());
    let resolution = resolver.resolve(source.as_str(), day);

    let preview = ResolvePreview {
        source_id: source.as_str().to_owned(),
        day: format_day(day),
        tier: resolution.tier,
        record_count: resolution.records.len(),
    };

    if wants_json(cli) {
        render_json(&preview, cli.pretty)?;
    } else {
        println!(
            "{} would resolve to tier '{}' with {} records on {}",
            preview.source_id,
            preview.tier.as_str(),
            preview.record_count,
            preview.day
        );
    }
    Ok(())
}
