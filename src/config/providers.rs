//! Provider credentials, chain order, and model ladders

use std::str::FromStr;

use serde::Deserialize;

use crate::domain::{ProviderChain, ProviderKind, ProviderSpec};

use super::error::ValidationError;

/// Provider configuration: API keys, chain order, and model ladders.
///
/// Model ladders are comma-separated lists. Models are tried in order
/// within one provider before the chain moves on to the next provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// Gemini API key
    pub gemini_api_key: Option<String>,

    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Anthropic API key
    pub anthropic_api_key: Option<String>,

    /// Provider order for the fallback chain, comma separated
    #[serde(default = "default_order")]
    pub order: String,

    /// Gemini model ladder, comma separated
    #[serde(default = "default_gemini_models")]
    pub gemini_models: String,

    /// OpenAI model ladder, comma separated
    #[serde(default = "default_openai_models")]
    pub openai_models: String,

    /// Anthropic model ladder, comma separated
    #[serde(default = "default_anthropic_models")]
    pub anthropic_models: String,
}

impl ProvidersConfig {
    /// Check if Gemini is configured
    pub fn has_gemini(&self) -> bool {
        self.api_key(ProviderKind::Gemini).is_some()
    }

    /// Check if OpenAI is configured
    pub fn has_openai(&self) -> bool {
        self.api_key(ProviderKind::OpenAi).is_some()
    }

    /// Check if Anthropic is configured
    pub fn has_anthropic(&self) -> bool {
        self.api_key(ProviderKind::Anthropic).is_some()
    }

    /// API key for a provider, if configured and non-blank.
    pub fn api_key(&self, kind: ProviderKind) -> Option<&str> {
        let key = match kind {
            ProviderKind::Gemini => self.gemini_api_key.as_deref(),
            ProviderKind::OpenAi => self.openai_api_key.as_deref(),
            ProviderKind::Anthropic => self.anthropic_api_key.as_deref(),
        };
        key.map(str::trim).filter(|k| !k.is_empty())
    }

    /// Model ladder for a provider, blanks filtered out.
    pub fn models_for(&self, kind: ProviderKind) -> Vec<String> {
        let raw = match kind {
            ProviderKind::Gemini => &self.gemini_models,
            ProviderKind::OpenAi => &self.openai_models,
            ProviderKind::Anthropic => &self.anthropic_models,
        };
        raw.split(',')
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .map(String::from)
            .collect()
    }

    /// Builds the fallback chain from configured providers.
    ///
    /// Providers appear in the configured order. A provider listed in the
    /// order but missing its API key is skipped, so a deployment with a
    /// single key still gets a working single-provider chain.
    ///
    /// # Errors
    ///
    /// Returns an error when the order names an unknown provider, when a
    /// configured provider has an empty model ladder, or when no provider
    /// has an API key at all.
    pub fn provider_chain(&self) -> Result<ProviderChain, ValidationError> {
        let mut specs = Vec::new();

        for token in self.order.split(',').map(str::trim) {
            if token.is_empty() {
                continue;
            }
            let kind = ProviderKind::from_str(token)
                .map_err(|_| ValidationError::UnknownProvider(token.to_string()))?;
            if self.api_key(kind).is_none() {
                continue;
            }
            let spec = ProviderSpec::new(kind, self.models_for(kind))
                .map_err(|_| ValidationError::NoModelsConfigured(kind.as_str()))?;
            specs.push(spec);
        }

        if specs.is_empty() {
            return Err(ValidationError::NoProviderConfigured);
        }
        Ok(ProviderChain::new(specs))
    }

    /// Validate provider configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.provider_chain().map(|_| ())
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            openai_api_key: None,
            anthropic_api_key: None,
            order: default_order(),
            gemini_models: default_gemini_models(),
            openai_models: default_openai_models(),
            anthropic_models: default_anthropic_models(),
        }
    }
}

fn default_order() -> String {
    "gemini,openai,anthropic".to_string()
}

fn default_gemini_models() -> String {
    [
        "gemini-2.5-flash",
        "gemini-2.5-flash-exp",
        "gemini-2.5-latest",
        "gemini-2.5-lite",
        "gemini-2.5-lite-latest",
        "gemini-flash-latest",
        "gemini-flash-lite-latest",
        "gemini-2.0-flash",
        "gemini-2.0-flash-exp",
        "gemini-2.5-pro",
    ]
    .join(",")
}

fn default_openai_models() -> String {
    "gpt-4o-mini".to_string()
}

fn default_anthropic_models() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}
