// src/enrich/openai.rs

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{normalize_name, user_prompt, CompletionSettings, EnrichError, NameGenerator, SYSTEM_PROMPT};

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub stop: Vec<String>,
}

impl ChatRequest {
    /// The naming request for `mime` under the given settings.
    pub fn for_mime(settings: &CompletionSettings, mime: &str) -> Self {
        Self {
            model: settings.model.clone(),
            messages: vec![Message::system(SYSTEM_PROMPT), Message::user(user_prompt(mime))],
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            top_p: settings.top_p,
            frequency_penalty: settings.frequency_penalty,
            presence_penalty: settings.presence_penalty,
            stop: settings.stop.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponseRaw {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatMessageResponse {
    // null when the model refuses or only calls tools
    pub content: Option<String>,
}

// =============================================================================
// Client
// =============================================================================

/// Chat-completion backed [`NameGenerator`].
#[derive(Clone)]
pub struct OpenAiNamer {
    http_client: Client,
    api_key: String,
    base_url: String,
    settings: CompletionSettings,
}

impl OpenAiNamer {
    pub fn new(http_client: Client, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            base_url: crate::config::DEFAULT_OPENAI_BASE_URL.to_string(),
            settings: CompletionSettings::default(),
        }
    }

    /// Base URL without the trailing `/chat/completions` (proxies, local fakes).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_settings(mut self, settings: CompletionSettings) -> Self {
        self.settings = settings;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn chat_completion(&self, request: &ChatRequest) -> Result<Option<String>, EnrichError> {
        if self.api_key.is_empty() {
            return Err(EnrichError::Config("OpenAI API key is empty".into()));
        }

        let response = self
            .http_client
            .post(self.endpoint())
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI request failed");
                EnrichError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %body, "OpenAI API error");
            return Err(EnrichError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw: ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| EnrichError::Parse(e.to_string()))?;

        Ok(raw
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

#[async_trait]
impl NameGenerator for OpenAiNamer {
    #[instrument(level = "debug", skip(self))]
    async fn generate_name(&self, mime: &str) -> Result<String, EnrichError> {
        let request = ChatRequest::for_mime(&self.settings, mime);
        let content = self.chat_completion(&request).await?;
        debug!(model = %self.settings.model, ?content, "raw completion");

        content
            .as_deref()
            .and_then(normalize_name)
            .ok_or_else(|| EnrichError::EmptyResponse(mime.to_string()))
    }
}
