//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("No provider has an API key configured")]
    NoProviderConfigured,

    #[error("Unknown provider in chain order: {0}")]
    UnknownProvider(String),

    #[error("Provider '{0}' has an empty model list")]
    NoModelsConfigured(&'static str),

    #[error("Candidate count must be at least 1")]
    InvalidCandidateCount,

    #[error("Concurrency limit must be at least 1")]
    InvalidConcurrency,

    #[error("Timeouts must be at least 1 second")]
    InvalidTimeout,

    #[error("Invalid scoring settings: {0}")]
    InvalidScoring(#[from] crate::domain::ValidationError),
}
