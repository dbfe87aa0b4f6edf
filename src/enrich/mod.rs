//! Human-readable names for MIME types, generated by a chat-completion model.

use async_trait::async_trait;
use thiserror::Error;

pub mod openai;

pub use openai::OpenAiNamer;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that understands MIME types.";

/// Errors from the name generator. All of them abort the run.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Missing or invalid client settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection failed before a response arrived
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response (auth failure, rate limit, bad request)
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Body was not the expected completion shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// No choices, or nothing left after trimming
    #[error("empty completion for {0}")]
    EmptyResponse(String),
}

/// Something that can label a MIME type.
#[async_trait]
pub trait NameGenerator: Send + Sync {
    async fn generate_name(&self, mime: &str) -> Result<String, EnrichError>;
}

/// Sampling settings sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub stop: Vec<String>,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: crate::config::DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 60,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stop: vec!["\n".to_string()],
        }
    }
}

impl CompletionSettings {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

pub fn user_prompt(mime: &str) -> String {
    format!(
        "Convert the MIME type '{}' into a human-readable name and return only the canonical name itself.",
        mime
    )
}

/// Trim the completion and keep only its first line. Returns `None` when
/// nothing printable is left.
pub fn normalize_name(raw: &str) -> Option<String> {
    let first = raw.trim().lines().next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}
