//! Destination table for enriched records.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::types::MimeRecord;

pub mod supabase;

pub use supabase::SupabaseStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx from the store: auth, constraint violation, missing table
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

/// What the store sent back for one upsert. `data` is `None` when no row
/// representation came back; rows are left as the store's JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpsertResponse {
    pub data: Option<Vec<Value>>,
}

impl UpsertResponse {
    /// True when the written row was echoed back.
    pub fn is_confirmed(&self) -> bool {
        self.data.as_ref().is_some_and(|rows| !rows.is_empty())
    }
}

/// Insert-or-update by `mime`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn upsert_record(&self, record: &MimeRecord) -> Result<UpsertResponse, StoreError>;
}
