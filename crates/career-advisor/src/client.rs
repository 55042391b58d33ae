use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AdvisorError;

/// Default OpenAI API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used for every advice request.
pub const MODEL: &str = "gpt-3.5-turbo";

/// Sampling temperature used for every advice request.
pub const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    pub api_key: String,
    /// Base URL for an OpenAI-compatible API, without the trailing
    /// `/chat/completions`.
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl ChatClientConfig {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_owned(),
            model: MODEL.to_owned(),
            temperature: TEMPERATURE,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Minimal non-streaming client for the Chat Completions API.
#[derive(Debug, Clone)]
pub struct ChatClient {
    config: ChatClientConfig,
    http: reqwest::Client,
}

impl ChatClient {
    pub fn new(config: ChatClientConfig) -> Result<Self, AdvisorError> {
        if config.api_key.is_empty() {
            return Err(AdvisorError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AdvisorError::Transport)?;

        Ok(Self { config, http })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send one system + user exchange and return the first choice's text.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, AdvisorError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let body = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: [
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
        };

        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", self.config.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value).map_err(|_| AdvisorError::InvalidApiKey)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        debug!(url = %url, model = %self.config.model, "sending completion request");

        let resp = self.http.post(&url).headers(headers).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AdvisorError::Status { status, body });
        }

        let parsed: ChatResponse = resp.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(AdvisorError::EmptyResponse)
    }
}
