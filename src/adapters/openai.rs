//! OpenAI transport - ProviderTransport implementation for the Chat
//! Completions API.
//!
//! No grounding support: the grounding flag is ignored and replies carry no
//! citations, so these candidates lean on the length and phrasing signals
//! at evaluation time.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::domain::ProviderKind;
use crate::ports::{ProviderFailure, ProviderTransport, RawReply, TransportRequest};

/// Configuration for the OpenAI transport.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL for the API.
    pub base_url: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Response length cap in tokens.
    pub max_tokens: u32,
}

impl OpenAiConfig {
    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

/// OpenAI API transport implementation.
pub struct OpenAiTransport {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiTransport {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn to_openai_request(&self, request: &TransportRequest) -> OpenAiRequest {
        OpenAiRequest {
            model: request.model.clone(),
            messages: vec![
                OpenAiMessage {
                    role: "system".to_string(),
                    content: request.system_prompt.clone(),
                },
                OpenAiMessage {
                    role: "user".to_string(),
                    content: request.user_prompt.clone(),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    fn classify_status(status: StatusCode, body: &str) -> ProviderFailure {
        match status.as_u16() {
            401 | 403 => ProviderFailure::invalid_credential(format!("status {status}: {body}")),
            404 => ProviderFailure::provider_unavailable(format!("model not found: {body}")),
            429 => ProviderFailure::quota_exhausted(format!("status {status}: {body}")),
            500..=599 => {
                ProviderFailure::provider_unavailable(format!("status {status}: {body}"))
            }
            _ => ProviderFailure::malformed_response(format!("unexpected status {status}: {body}")),
        }
    }

    fn extract_reply(response: OpenAiResponse) -> Result<RawReply, ProviderFailure> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderFailure::malformed_response("no choices in response"))?;

        Ok(RawReply::text_only(choice.message.content))
    }
}

#[async_trait]
impl ProviderTransport for OpenAiTransport {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn generate(&self, request: TransportRequest) -> Result<RawReply, ProviderFailure> {
        let openai_request = self.to_openai_request(&request);

        let response = self
            .client
            .post(self.completions_url())
            .header(
                "Authorization",
                format!("Bearer {}", request.credential.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderFailure::transient_network("request timed out")
                } else if e.is_connect() {
                    ProviderFailure::transient_network(format!("connection failed: {e}"))
                } else {
                    ProviderFailure::transient_network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_status(status, &body));
        }

        let parsed: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| ProviderFailure::malformed_response(format!("parse failed: {e}")))?;

        Self::extract_reply(parsed)
    }
}

// Wire types for the Chat Completions API.

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}
