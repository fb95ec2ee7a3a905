//! Provider fallback chain value objects.
//!
//! A chain is declared as an ordered list of [`ProviderSpec`]s and flattened
//! into [`ChainEntry`] positions, one per (provider, model) pair. Fallback
//! always walks entries in flattening order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::ValidationError;

/// The closed set of supported AI providers.
///
/// Adding a provider means adding a variant here plus a transport adapter
/// for it; nothing else in the pipeline changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    /// All supported providers, in the default chain order.
    pub const ALL: [ProviderKind; 3] = [Self::Gemini, Self::OpenAi, Self::Anthropic];

    /// Stable lowercase name, used in logs, config, and credential refs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(ValidationError::invalid_format(
                "provider",
                format!("unknown provider '{other}'"),
            )),
        }
    }
}

/// Opaque reference to a stored credential.
///
/// The chain carries references only; the credential store resolves them to
/// secret values at call time. Two chain entries share a credential exactly
/// when their references are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialRef(String);

impl CredentialRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The default reference for a provider, named after the provider itself.
    pub fn for_provider(provider: ProviderKind) -> Self {
        Self(provider.as_str().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CredentialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One provider's contribution to the fallback chain: an ordered model
/// ladder plus the credential those models share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpec {
    provider: ProviderKind,
    models: Vec<String>,
    credential: CredentialRef,
}

impl ProviderSpec {
    /// Creates a spec with the provider's default credential reference.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyField` if the model list is empty or
    /// contains a blank identifier.
    pub fn new(
        provider: ProviderKind,
        models: Vec<String>,
    ) -> Result<Self, ValidationError> {
        if models.is_empty() {
            return Err(ValidationError::empty_field("models"));
        }
        if models.iter().any(|m| m.trim().is_empty()) {
            return Err(ValidationError::empty_field("model"));
        }

        Ok(Self {
            provider,
            models,
            credential: CredentialRef::for_provider(provider),
        })
    }

    /// Overrides the credential reference.
    pub fn with_credential(mut self, reference: impl Into<String>) -> Self {
        self.credential = CredentialRef::new(reference);
        self
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn credential(&self) -> &CredentialRef {
        &self.credential
    }
}

/// One flattened fallback position: a single model at a single provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEntry {
    index: usize,
    provider: ProviderKind,
    model: String,
    credential: CredentialRef,
}

impl ChainEntry {
    /// Position in the flattened chain, starting at zero.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn credential(&self) -> &CredentialRef {
        &self.credential
    }
}

impl fmt::Display for ChainEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// An ordered fallback chain over provider specs.
///
/// Flattening preserves declaration order: every model of the first spec
/// comes before every model of the second, and entry indices increase
/// strictly. A chain may be empty; starting a run on an empty chain is a
/// configuration error surfaced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderChain {
    specs: Vec<ProviderSpec>,
    entries: Vec<ChainEntry>,
}

impl ProviderChain {
    pub fn new(specs: Vec<ProviderSpec>) -> Self {
        let mut entries = Vec::new();
        for spec in &specs {
            for model in spec.models() {
                entries.push(ChainEntry {
                    index: entries.len(),
                    provider: spec.provider(),
                    model: model.clone(),
                    credential: spec.credential().clone(),
                });
            }
        }
        Self { specs, entries }
    }

    pub fn specs(&self) -> &[ProviderSpec] {
        &self.specs
    }

    /// Flattened attempt positions in fallback order.
    pub fn entries(&self) -> &[ChainEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
