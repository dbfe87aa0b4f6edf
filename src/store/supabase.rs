// src/store/supabase.rs

use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{RecordStore, StoreError, UpsertResponse};
use crate::types::MimeRecord;

const CONFLICT_KEY: &str = "mime";
const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=representation";

/// Supabase (PostgREST) table client.
#[derive(Clone)]
pub struct SupabaseStore {
    http_client: Client,
    base_url: Url,
    api_key: String,
    table: String,
}

impl SupabaseStore {
    pub fn new(
        http_client: Client,
        base_url: Url,
        api_key: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url,
            api_key: api_key.into(),
            table: table.into(),
        }
    }

    /// `{base}/rest/v1/{table}?on_conflict=mime`
    pub fn table_url(&self) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Parse(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(["rest", "v1", self.table.as_str()]);
        url.query_pairs_mut().append_pair("on_conflict", CONFLICT_KEY);
        Ok(url)
    }
}

/// PostgREST answers with an array of rows, a single object, or nothing.
/// Rows are kept as raw JSON: the table may carry extra or rewritten columns.
fn parse_representation(body: &str) -> Result<Option<Vec<Value>>, StoreError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(body).map_err(|e| StoreError::Parse(e.to_string()))?;
    Ok(match value {
        Value::Null => None,
        Value::Array(rows) => Some(rows),
        row => Some(vec![row]),
    })
}

#[async_trait]
impl RecordStore for SupabaseStore {
    #[instrument(level = "debug", skip(self, record), fields(mime = %record.mime))]
    async fn upsert_record(&self, record: &MimeRecord) -> Result<UpsertResponse, StoreError> {
        let url = self.table_url()?;
        debug!(%url, "upserting");

        let response = self
            .http_client
            .post(url)
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header("Prefer", UPSERT_PREFER)
            .json(record)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "store request failed");
                StoreError::Network(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(UpsertResponse {
            data: parse_representation(&body)?,
        })
    }
}
