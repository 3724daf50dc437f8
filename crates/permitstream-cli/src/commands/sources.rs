use serde::Serialize;

use permitstream_core::{builtin_source_ids, SampleRegistry};

use crate::cli::Cli;
use crate::error::CliError;

use super::{render_json, wants_json};

#[derive(Debug, Serialize)]
struct SourceEntry {
    id: String,
    has_placeholder_generator: bool,
}

#[derive(Debug, Serialize)]
struct SourcesListing {
    sources: Vec<SourceEntry>,
}

pub fn run(cli: &Cli) -> Result<(), CliError> {
    let samples = SampleRegistry::builtin();
    let sources = builtin_source_ids()
        .into_iter()
        .map(|id| SourceEntry {
            has_placeholder_generator: samples.get(id.as_str()).is_some(),
            id: id.as_str().to_owned(),
        })
        .collect();
    let listing = SourcesListing { sources };

    if wants_json(cli) {
        render_json(&listing, cli.pretty)?;
    } else {
        for entry in &listing.sources {
            let fallback = if entry.has_placeholder_generator {
                "placeholder"
            } else {
                "real-data-only"
            };
            println!("{:<16} {fallback}", entry.id);
        }
    }
    Ok(())
}
