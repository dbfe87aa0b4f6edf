// src/pipeline.rs

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{error, info, instrument};
use url::Url;

use crate::enrich::NameGenerator;
use crate::fetch::fetch_mime_table;
use crate::store::RecordStore;
use crate::types::MimeEntry;

/// Outcome of one run. Only persist failures end up in `failed` (by MIME
/// type); fetch and naming failures abort the run instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub scraped: usize,
    pub inserted: usize,
    pub failed: Vec<String>,
}

/// Scrape `source`, then name and upsert every row in document order.
#[instrument(level = "info", skip(client, source, namer, store), fields(source = %source))]
pub async fn run(
    client: &Client,
    source: &Url,
    namer: &dyn NameGenerator,
    store: &dyn RecordStore,
) -> Result<RunSummary> {
    let entries = fetch_mime_table(client, source)
        .await
        .with_context(|| format!("fetching MIME table from {}", source))?;
    persist_all(entries, namer, store).await
}

/// The enrich → persist loop. A naming error stops the loop and is returned;
/// a store error is logged and the next entry is processed.
pub async fn persist_all(
    entries: Vec<MimeEntry>,
    namer: &dyn NameGenerator,
    store: &dyn RecordStore,
) -> Result<RunSummary> {
    let mut summary = RunSummary {
        scraped: entries.len(),
        ..Default::default()
    };

    for entry in entries {
        let name = namer
            .generate_name(&entry.mime)
            .await
            .with_context(|| format!("generating name for {}", entry.mime))?;
        let record = entry.with_name(name);

        match store.upsert_record(&record).await {
            Ok(resp) if resp.is_confirmed() => {
                info!(mime = %record.mime, name = %record.name, "successfully inserted");
                summary.inserted += 1;
            }
            Ok(_) => {
                error!(mime = %record.mime, "failed to insert: store returned no row");
                summary.failed.push(record.mime);
            }
            Err(e) => {
                error!(mime = %record.mime, error = %e, "failed to insert");
                summary.failed.push(record.mime);
            }
        }
    }

    Ok(summary)
}
