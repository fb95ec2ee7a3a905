//! Run identifiers and pipeline result value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::chain::{ChainEntry, ProviderKind};

/// Unique identifier for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Creates a new random RunId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a RunId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A source citation attached to generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    url: String,
    title: Option<String>,
}

impl Citation {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.title = (!title.is_empty()).then_some(title);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

/// One normalized provider answer, tagged with the chain entry it came from.
///
/// Construction de-duplicates citations by URL, keeping first occurrence
/// order, so downstream scoring counts each source once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    text: String,
    citations: Vec<Citation>,
    origin: ChainEntry,
}

impl GenerationResult {
    pub fn new(text: impl Into<String>, citations: Vec<Citation>, origin: ChainEntry) -> Self {
        let mut seen = std::collections::HashSet::new();
        let citations = citations
            .into_iter()
            .filter(|citation| seen.insert(citation.url().to_string()))
            .collect();

        Self {
            text: text.into(),
            citations,
            origin,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    pub fn citation_count(&self) -> usize {
        self.citations.len()
    }

    /// The chain entry that produced this answer.
    pub fn origin(&self) -> &ChainEntry {
        &self.origin
    }
}

/// Terminal outcome of a pipeline run that ran to completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// A winning guide hint the evaluator trusts.
    Guide {
        text: String,
        provider: ProviderKind,
        model: String,
        score: f64,
    },
    /// No candidate cleared the confidence bar.
    NoReliableHint,
}

impl PipelineOutcome {
    /// Text shown to the player when no candidate was reliable enough.
    pub const NO_RELIABLE_HINT: &'static str =
        "No reliable hint could be confirmed from the available guides.";

    pub fn guide(
        text: impl Into<String>,
        provider: ProviderKind,
        model: impl Into<String>,
        score: f64,
    ) -> Self {
        Self::Guide {
            text: text.into(),
            provider,
            model: model.into(),
            score,
        }
    }

    pub fn is_guide(&self) -> bool {
        matches!(self, Self::Guide { .. })
    }

    /// The text to show the player, whichever way the run ended.
    pub fn display_text(&self) -> &str {
        match self {
            Self::Guide { text, .. } => text,
            Self::NoReliableHint => Self::NO_RELIABLE_HINT,
        }
    }
}
