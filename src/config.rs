// src/config.rs

use anyhow::{bail, Context, Result};
use std::{env, fmt};
use url::Url;

pub const DEFAULT_SOURCE_URL: &str = "https://mimetype.io/all-types";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_TABLE: &str = "mime_type";

const REQUIRED_KEYS: &[&str] = &["OPENAI_API_KEY", "SUPABASE_URL", "SUPABASE_ANON_KEY"];

/// Everything the run needs, validated up front.
#[derive(Clone)]
pub struct Config {
    pub source_url: Url,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub supabase_url: Url,
    pub supabase_anon_key: String,
    pub supabase_table: String,
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as missing, and
    /// every missing required key is reported in a single error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let missing: Vec<&str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            bail!("missing required configuration: {}", missing.join(", "));
        }

        let require = |key: &str| get(key).with_context(|| format!("{} must be set", key));

        let supabase_raw = require("SUPABASE_URL")?;
        let supabase_url =
            Url::parse(&supabase_raw).with_context(|| format!("parsing SUPABASE_URL {}", supabase_raw))?;

        let source_raw = get("MIME_SOURCE_URL").unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());
        let source_url =
            Url::parse(&source_raw).with_context(|| format!("parsing MIME_SOURCE_URL {}", source_raw))?;

        let openai_base_url =
            get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
        Url::parse(&openai_base_url)
            .with_context(|| format!("parsing OPENAI_BASE_URL {}", openai_base_url))?;

        Ok(Self {
            source_url,
            openai_api_key: require("OPENAI_API_KEY")?,
            openai_base_url: openai_base_url.trim_end_matches('/').to_string(),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            supabase_url,
            supabase_anon_key: require("SUPABASE_ANON_KEY")?,
            supabase_table: get("SUPABASE_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("source_url", &self.source_url.as_str())
            .field("openai_api_key", &"<redacted>")
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("supabase_url", &self.supabase_url.as_str())
            .field("supabase_anon_key", &"<redacted>")
            .field("supabase_table", &self.supabase_table)
            .finish()
    }
}
