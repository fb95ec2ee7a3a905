//! Provider transport port: one generation call to one AI vendor.

use async_trait::async_trait;
use secrecy::Secret;
use thiserror::Error;

use crate::domain::{Citation, ProviderKind};

/// One outbound generation call, fully assembled.
///
/// Carries the resolved credential for exactly this call; the value is
/// dropped with the request and never cached by the transport.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Model identifier within the provider's catalogue.
    pub model: String,
    /// System prompt conditioning the answer.
    pub system_prompt: String,
    /// The player-facing question.
    pub user_prompt: String,
    /// Ask the provider to ground the answer in web search, where supported.
    pub grounding: bool,
    /// Credential for this call only.
    pub credential: Secret<String>,
}

/// Raw provider output before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl RawReply {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }
}

/// A provider call failure, classified for fallback decisions.
///
/// Classification is what the orchestrator acts on: most failures advance
/// the chain to its next entry, while an invalid credential skips every
/// remaining entry that would use the same credential.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderFailure {
    /// Quota or rate limit exhausted for this model.
    #[error("quota exhausted: {detail}")]
    QuotaExhausted { detail: String },

    /// Connectivity trouble, including request timeouts.
    #[error("transient network failure: {detail}")]
    TransientNetwork { detail: String },

    /// The credential was rejected or is not configured.
    #[error("invalid credential: {detail}")]
    InvalidCredential { detail: String },

    /// The provider reported a server-side fault or unknown model.
    #[error("provider unavailable: {detail}")]
    ProviderUnavailable { detail: String },

    /// The response arrived without the fields we expect, or empty.
    #[error("malformed response: {detail}")]
    MalformedResponse { detail: String },
}

impl ProviderFailure {
    pub fn quota_exhausted(detail: impl Into<String>) -> Self {
        Self::QuotaExhausted {
            detail: detail.into(),
        }
    }

    pub fn transient_network(detail: impl Into<String>) -> Self {
        Self::TransientNetwork {
            detail: detail.into(),
        }
    }

    pub fn invalid_credential(detail: impl Into<String>) -> Self {
        Self::InvalidCredential {
            detail: detail.into(),
        }
    }

    pub fn provider_unavailable(detail: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            detail: detail.into(),
        }
    }

    pub fn malformed_response(detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            detail: detail.into(),
        }
    }

    /// True when this failure concerns the credential rather than the call.
    pub fn is_credential(&self) -> bool {
        matches!(self, Self::InvalidCredential { .. })
    }

    /// Stable snake_case label for events and logs.
    pub fn classification(&self) -> &'static str {
        match self {
            Self::QuotaExhausted { .. } => "quota_exhausted",
            Self::TransientNetwork { .. } => "transient_network",
            Self::InvalidCredential { .. } => "invalid_credential",
            Self::ProviderUnavailable { .. } => "provider_unavailable",
            Self::MalformedResponse { .. } => "malformed_response",
        }
    }
}

/// Port for calling one AI provider's generation API.
///
/// Implementations are stateless request/response translators: they build
/// the wire request, map the provider's failure modes onto
/// [`ProviderFailure`], and extract text plus citations. Retry, timeout,
/// and fallback policy all live above this port.
#[async_trait]
pub trait ProviderTransport: Send + Sync {
    /// The provider this transport talks to.
    fn kind(&self) -> ProviderKind;

    /// Performs one generation call.
    async fn generate(&self, request: TransportRequest) -> Result<RawReply, ProviderFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_labels() {
        assert_eq!(
            ProviderFailure::quota_exhausted("429").classification(),
            "quota_exhausted"
        );
        assert_eq!(
            ProviderFailure::transient_network("timed out").classification(),
            "transient_network"
        );
        assert_eq!(
            ProviderFailure::invalid_credential("rejected").classification(),
            "invalid_credential"
        );
        assert_eq!(
            ProviderFailure::provider_unavailable("503").classification(),
            "provider_unavailable"
        );
        assert_eq!(
            ProviderFailure::malformed_response("no text").classification(),
            "malformed_response"
        );
    }

    #[test]
    fn test_only_credential_failures_are_credential() {
        assert!(ProviderFailure::invalid_credential("rejected").is_credential());
        assert!(!ProviderFailure::quota_exhausted("429").is_credential());
        assert!(!ProviderFailure::malformed_response("empty").is_credential());
    }

    #[test]
    fn test_error_messages_include_detail() {
        let failure = ProviderFailure::transient_network("connection reset");
        assert_eq!(
            failure.to_string(),
            "transient network failure: connection reset"
        );
    }
}
