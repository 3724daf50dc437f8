use serde::Serialize;

use permitstream_core::{format_day, SnapshotStore, SourceId};

use crate::cli::{Cli, SnapshotsArgs};
use crate::error::CliError;

use super::{render_json, store_for, wants_json};

#[derive(Debug, Serialize)]
struct SnapshotListing {
    sources: Vec<SourceDays>,
}

#[derive(Debug, Serialize)]
struct SourceDays {
    source_id: String,
    days: Vec<String>,
}

pub fn run(cli: &Cli, args: &SnapshotsArgs) -> Result<(), CliError> {
    let store = store_for(cli);

    let sources = match &args.source {
        Some(raw) => {
            let source = SourceId::new(raw.clone())?;
            let days = store.list_days(source.as_str())?;
            vec![(source.as_str().to_owned(), days)]
        }
        None => store.list_all_days()?,
    };
    let listing = SnapshotListing {
        sources: sources
            .into_iter()
            .map(|(source_id, days)| SourceDays {
                source_id,
                days: days.into_iter().map(format_day).collect(),
            })
            .collect(),
    };

    if wants_json(cli) {
        render_json(&listing, cli.pretty)?;
    } else if listing.sources.is_empty() {
        println!("no snapshots stored");
    } else {
        for source in &listing.sources {
            println!("{}: {}", source.source_id, source.days.join(", "));
        }
    }
    Ok(())
}
