//! Gemini transport - ProviderTransport implementation for Google's
//! Generative Language API.
//!
//! The only transport that supports search grounding: when the request asks
//! for it, the call carries the `google_search` tool and the response's
//! grounding attributions come back as citations.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::default()
//!     .with_base_url("https://generativelanguage.googleapis.com/v1beta");
//!
//! let transport = GeminiTransport::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::domain::{Citation, ProviderKind};
use crate::ports::{ProviderFailure, ProviderTransport, RawReply, TransportRequest};

/// Configuration for the Gemini transport.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL for the API.
    pub base_url: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling cutoff.
    pub top_p: f32,
    /// Top-k sampling cutoff.
    pub top_k: u32,
    /// Response length cap in tokens.
    pub max_output_tokens: u32,
}

impl GeminiConfig {
    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            temperature: 0.3,
            top_p: 0.8,
            top_k: 20,
            max_output_tokens: 500,
        }
    }
}

/// Gemini API transport implementation.
pub struct GeminiTransport {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTransport {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Builds the generateContent endpoint URL. The key rides in the query
    /// string, which is why request URLs must never reach logs.
    fn generate_url(&self, model: &str, api_key: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, model, api_key
        )
    }

    fn to_gemini_request(&self, request: &TransportRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: request.user_prompt.clone(),
                }],
            }],
            tools: request.grounding.then(|| {
                vec![GeminiTool {
                    google_search: GeminiGoogleSearch {},
                }]
            }),
            system_instruction: GeminiContent {
                parts: vec![GeminiPart {
                    text: request.system_prompt.clone(),
                }],
            },
            generation_config: GeminiGenerationConfig {
                candidate_count: 1,
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }

    /// Maps a non-success status onto a failure classification.
    ///
    /// Gemini reports bad API keys as 400 with an explanatory body, so the
    /// body is consulted before falling through to the generic mapping.
    fn classify_status(status: StatusCode, body: &str) -> ProviderFailure {
        match status.as_u16() {
            401 | 403 => ProviderFailure::invalid_credential(format!("status {status}: {body}")),
            400 if body.contains("API key not valid") || body.contains("API_KEY_INVALID") => {
                ProviderFailure::invalid_credential(format!("status {status}: {body}"))
            }
            404 => ProviderFailure::provider_unavailable(format!("model not found: {body}")),
            429 => ProviderFailure::quota_exhausted(format!("status {status}: {body}")),
            500..=599 => {
                ProviderFailure::provider_unavailable(format!("status {status}: {body}"))
            }
            _ => ProviderFailure::malformed_response(format!("unexpected status {status}: {body}")),
        }
    }

    /// Pulls text and grounding citations out of a parsed response.
    fn extract_reply(response: GeminiResponse) -> Result<RawReply, ProviderFailure> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderFailure::malformed_response("no candidates in response"))?;

        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let mut citations = Vec::new();
        let mut seen = std::collections::HashSet::new();
        if let Some(metadata) = candidate.grounding_metadata {
            for attribution in metadata.grounding_attributions {
                let Some(web) = attribution.web else { continue };
                let Some(uri) = web.uri.filter(|u| !u.is_empty()) else {
                    continue;
                };
                if !seen.insert(uri.clone()) {
                    continue;
                }
                let mut citation = Citation::new(uri);
                if let Some(title) = web.title {
                    citation = citation.with_title(title);
                }
                citations.push(citation);
            }
        }

        Ok(RawReply { text, citations })
    }
}

#[async_trait]
impl ProviderTransport for GeminiTransport {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn generate(&self, request: TransportRequest) -> Result<RawReply, ProviderFailure> {
        let gemini_request = self.to_gemini_request(&request);
        let url = self.generate_url(&request.model, request.credential.expose_secret());

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&gemini_request)
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

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderFailure::malformed_response(format!("parse failed: {e}")))?;

        Self::extract_reply(parsed)
    }
}

// Wire types for the Generative Language API.

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
    #[serde(rename = "systemInstruction")]
    system_instruction: GeminiContent,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiTool {
    google_search: GeminiGoogleSearch,
}

#[derive(Debug, Serialize)]
struct GeminiGoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    candidate_count: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    grounding_metadata: Option<GeminiGroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGroundingMetadata {
    #[serde(default)]
    grounding_attributions: Vec<GeminiAttribution>,
}

#[derive(Debug, Deserialize)]
struct GeminiAttribution {
    web: Option<GeminiWebSource>,
}

#[derive(Debug, Deserialize)]
struct GeminiWebSource {
    uri: Option<String>,
    title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn request(grounding: bool) -> TransportRequest {
        TransportRequest {
            model: "gemini-2.5-flash".to_string(),
            system_prompt: "You are a guide assistant.".to_string(),
            user_prompt: "What should the player do next?".to_string(),
            grounding,
            credential: Secret::new("test-key".to_string()),
        }
    }

    #[test]
    fn test_request_includes_search_tool_when_grounding() {
        let transport = GeminiTransport::new(GeminiConfig::default());
        let wire = transport.to_gemini_request(&request(true));
        let json = serde_json::to_value(&wire).unwrap();

        assert_eq!(json["tools"][0]["google_search"], serde_json::json!({}));
        assert_eq!(json["generationConfig"]["candidateCount"], 1);
        assert_eq!(json["generationConfig"]["topK"], 20);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 500);
        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            "You are a guide assistant."
        );
    }

    #[test]
    fn test_request_omits_tools_without_grounding() {
        let transport = GeminiTransport::new(GeminiConfig::default());
        let wire = transport.to_gemini_request(&request(false));
        let json = serde_json::to_value(&wire).unwrap();

        assert!(json.get("tools").is_none());
    }

    #[test]
    fn test_url_carries_model_and_key() {
        let transport = GeminiTransport::new(GeminiConfig::default());
        let url = transport.generate_url("gemini-2.0-flash", "k-123");
        assert_eq!(
            url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent?key=k-123"
        );
    }

    #[test]
    fn test_classify_status_mappings() {
        assert_eq!(
            GeminiTransport::classify_status(StatusCode::TOO_MANY_REQUESTS, "")
                .classification(),
            "quota_exhausted"
        );
        assert!(GeminiTransport::classify_status(StatusCode::UNAUTHORIZED, "")
            .is_credential());
        assert!(GeminiTransport::classify_status(StatusCode::FORBIDDEN, "").is_credential());
        assert!(GeminiTransport::classify_status(
            StatusCode::BAD_REQUEST,
            r#"{"error": {"message": "API key not valid. Please pass a valid API key."}}"#
        )
        .is_credential());
        assert_eq!(
            GeminiTransport::classify_status(StatusCode::NOT_FOUND, "unknown model")
                .classification(),
            "provider_unavailable"
        );
        assert_eq!(
            GeminiTransport::classify_status(StatusCode::SERVICE_UNAVAILABLE, "")
                .classification(),
            "provider_unavailable"
        );
        assert_eq!(
            GeminiTransport::classify_status(StatusCode::IM_A_TEAPOT, "")
                .classification(),
            "malformed_response"
        );
    }

    #[test]
    fn test_extract_reply_joins_parts_and_dedups_citations() {
        let raw = r#"{
            "candidates": [{
                "content": {
                    "parts": [{"text": "Head to the bench, "}, {"text": "then rest."}]
                },
                "groundingMetadata": {
                    "groundingAttributions": [
                        {"web": {"uri": "https://wiki.example/mantis", "title": "Mantis Lords"}},
                        {"web": {"uri": "https://wiki.example/mantis", "title": "Duplicate"}},
                        {"web": {"uri": "https://guide.example/hk"}},
                        {"web": {"uri": "", "title": "Empty"}}
                    ]
                }
            }]
        }"#;

        let response: GeminiResponse = serde_json::from_str(raw).unwrap();
        let reply = GeminiTransport::extract_reply(response).unwrap();

        assert_eq!(reply.text, "Head to the bench, then rest.");
        assert_eq!(reply.citations.len(), 2);
        assert_eq!(reply.citations[0].url(), "https://wiki.example/mantis");
        assert_eq!(reply.citations[0].title(), Some("Mantis Lords"));
        assert_eq!(reply.citations[1].url(), "https://guide.example/hk");
        assert_eq!(reply.citations[1].title(), None);
    }

    #[test]
    fn test_extract_reply_without_candidates_is_malformed() {
        let response: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        let failure = GeminiTransport::extract_reply(response).unwrap_err();
        assert_eq!(failure.classification(), "malformed_response");
    }
}
