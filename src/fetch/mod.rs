// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

pub mod table;

pub use table::{fetch_mime_table, parse_mime_table};

/// GET `url` and return the body as text. The status code is logged but not
/// enforced: error pages are still handed back for parsing.
pub async fn get_text(client: &Client, url: &Url) -> Result<String> {
    debug!("Fetching text from {}", url);
    let resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?;

    let status = resp.status();
    if !status.is_success() {
        warn!(%url, %status, "non-success status, parsing body anyway");
    }

    resp.text()
        .await
        .with_context(|| format!("Reading text from {}", url))
}
