//! Pipeline tuning: candidate counts, concurrency, and timeouts

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of candidate replies generated per run
    #[serde(default = "default_candidates")]
    pub candidates: usize,

    /// Maximum candidate chain walks running at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Per-provider-call timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Whole-run timeout in seconds
    #[serde(default = "default_run_timeout")]
    pub run_timeout_secs: u64,

    /// Whether provider calls ask for search grounding
    #[serde(default = "default_grounding")]
    pub grounding: bool,
}

impl PipelineConfig {
    /// Get per-call timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get whole-run timeout as Duration
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    /// Concurrency limit actually applied, never below one.
    pub fn concurrency_limit(&self) -> usize {
        self.max_concurrency.max(1)
    }

    /// Validate pipeline configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.candidates == 0 {
            return Err(ValidationError::InvalidCandidateCount);
        }
        if self.max_concurrency == 0 {
            return Err(ValidationError::InvalidConcurrency);
        }
        if self.request_timeout_secs == 0 || self.run_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
            max_concurrency: default_max_concurrency(),
            request_timeout_secs: default_request_timeout(),
            run_timeout_secs: default_run_timeout(),
            grounding: default_grounding(),
        }
    }
}

fn default_candidates() -> usize {
    3
}

fn default_max_concurrency() -> usize {
    3
}

fn default_request_timeout() -> u64 {
    30
}

fn default_run_timeout() -> u64 {
    180
}

fn default_grounding() -> bool {
    true
}
