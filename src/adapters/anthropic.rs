//! Anthropic transport - ProviderTransport implementation for the Messages
//! API. Ignores the grounding flag; replies carry no citations.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::domain::ProviderKind;
use crate::ports::{ProviderFailure, ProviderTransport, RawReply, TransportRequest};

/// Configuration for the Anthropic transport.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// Base URL for the API.
    pub base_url: String,
    /// API version header value.
    pub version: String,
    /// Response length cap in tokens.
    pub max_tokens: u32,
}

impl AnthropicConfig {
    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            version: "2023-06-01".to_string(),
            max_tokens: 500,
        }
    }
}

/// Anthropic API transport implementation.
pub struct AnthropicTransport {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicTransport {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url)
    }

    fn to_anthropic_request(&self, request: &TransportRequest) -> AnthropicRequest {
        AnthropicRequest {
            model: request.model.clone(),
            max_tokens: self.config.max_tokens,
            system: request.system_prompt.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: request.user_prompt.clone(),
            }],
        }
    }

    fn classify_status(status: StatusCode, body: &str) -> ProviderFailure {
        match status.as_u16() {
            401 | 403 => ProviderFailure::invalid_credential(format!("status {status}: {body}")),
            404 => ProviderFailure::provider_unavailable(format!("model not found: {body}")),
            429 => ProviderFailure::quota_exhausted(format!("status {status}: {body}")),
            // Covers Anthropic's 529 overloaded status as well.
            500..=599 => {
                ProviderFailure::provider_unavailable(format!("status {status}: {body}"))
            }
            _ => ProviderFailure::malformed_response(format!("unexpected status {status}: {body}")),
        }
    }

    fn extract_reply(response: AnthropicResponse) -> Result<RawReply, ProviderFailure> {
        if response.content.is_empty() {
            return Err(ProviderFailure::malformed_response("no content in response"));
        }

        let text = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(RawReply::text_only(text))
    }
}

#[async_trait]
impl ProviderTransport for AnthropicTransport {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    async fn generate(&self, request: TransportRequest) -> Result<RawReply, ProviderFailure> {
        let anthropic_request = self.to_anthropic_request(&request);

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", request.credential.expose_secret())
            .header("anthropic-version", self.config.version.as_str())
            .header("Content-Type", "application/json")
            .json(&anthropic_request)
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

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ProviderFailure::malformed_response(format!("parse failed: {e}")))?;

        Self::extract_reply(parsed)
    }
}

// Wire types for the Messages API.

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn request() -> TransportRequest {
        TransportRequest {
            model: "claude-3-5-sonnet-20241022".to_string(),
            system_prompt: "You are a guide assistant.".to_string(),
            user_prompt: "What should the player do next?".to_string(),
            grounding: false,
            credential: Secret::new("test-key".to_string()),
        }
    }

    #[test]
    fn test_request_shape() {
        let transport = AnthropicTransport::new(AnthropicConfig::default());
        let wire = transport.to_anthropic_request(&request());
        let json = serde_json::to_value(&wire).unwrap();

        assert_eq!(json["model"], "claude-3-5-sonnet-20241022");
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(json["system"], "You are a guide assistant.");
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_classify_status_mappings() {
        assert!(AnthropicTransport::classify_status(StatusCode::UNAUTHORIZED, "").is_credential());
        assert_eq!(
            AnthropicTransport::classify_status(StatusCode::TOO_MANY_REQUESTS, "")
                .classification(),
            "quota_exhausted"
        );
        assert_eq!(
            AnthropicTransport::classify_status(StatusCode::from_u16(529).unwrap(), "overloaded")
                .classification(),
            "provider_unavailable"
        );
    }

    #[test]
    fn test_extract_reply_joins_text_blocks() {
        let raw = r#"{
            "content": [
                {"type": "text", "text": "Equip the charm, "},
                {"type": "tool_use", "text": ""},
                {"type": "text", "text": "then head down."}
            ]
        }"#;
        let response: AnthropicResponse = serde_json::from_str(raw).unwrap();
        let reply = AnthropicTransport::extract_reply(response).unwrap();

        assert_eq!(reply.text, "Equip the charm, then head down.");
    }

    #[test]
    fn test_extract_reply_without_content_is_malformed() {
        let response: AnthropicResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        let failure = AnthropicTransport::extract_reply(response).unwrap_err();
        assert_eq!(failure.classification(), "malformed_response");
    }
}
