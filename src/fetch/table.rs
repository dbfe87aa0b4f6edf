// src/fetch/table.rs

use anyhow::Result;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, instrument, trace};
use url::Url;

use super::get_text;
use crate::types::MimeEntry;

const EXTENSION_SEPARATOR: &str = ", ";

/// Fetch the reference page and extract every `(mime, extensions)` row.
#[instrument(level = "info", skip(client, url), fields(url = %url))]
pub async fn fetch_mime_table(client: &Client, url: &Url) -> Result<Vec<MimeEntry>> {
    let html = get_text(client, url).await?;
    let entries = parse_mime_table(&html);
    info!(rows = entries.len(), "parsed MIME table");
    Ok(entries)
}

/// Rows need at least two `td` cells; anything shorter is skipped.
/// Column 0 is the MIME type, column 1 a `", "`-separated extension list.
///
/// Rows that sit outside any `<table>` still count: the tree builder drops
/// orphan `tr`/`td` tags, so such input is re-parsed inside a table.
pub fn parse_mime_table(html: &str) -> Vec<MimeEntry> {
    let table_sel = Selector::parse("table").expect("selector for tables should parse");
    let mut doc = Html::parse_document(html);
    if doc.select(&table_sel).next().is_none() {
        doc = Html::parse_fragment(&format!("<table>{}</table>", html));
    }

    let row_sel = Selector::parse("tr").expect("selector for table rows should parse");
    let cell_sel = Selector::parse("td").expect("selector for table cells should parse");

    doc.select(&row_sel)
        .filter_map(|row| {
            let cells: Vec<ElementRef> = row.select(&cell_sel).collect();
            if cells.len() < 2 {
                trace!(cells = cells.len(), "skipping short row");
                return None;
            }
            Some(MimeEntry {
                mime: cell_text(&cells[0]),
                extensions: split_extensions(&cell_text(&cells[1])),
            })
        })
        .collect()
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

// An empty cell yields [""], not [].
fn split_extensions(raw: &str) -> Vec<String> {
    raw.split(EXTENSION_SEPARATOR).map(str::to_string).collect()
}
