use serde::{Deserialize, Serialize};

/// One qualifying row of the scraped table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeEntry {
    pub mime: String,
    pub extensions: Vec<String>,
}

/// The row written to the destination table, keyed by `mime`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimeRecord {
    pub mime: String,
    pub name: String,
    pub extensions: Vec<String>,
}

impl MimeEntry {
    /// Attach the generated label, consuming the entry.
    pub fn with_name(self, name: impl Into<String>) -> MimeRecord {
        MimeRecord {
            mime: self.mime,
            name: name.into(),
            extensions: self.extensions,
        }
    }
}
