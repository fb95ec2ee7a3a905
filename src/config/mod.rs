//! Engine configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is
//! loaded with the `NEXTSTEP` prefix and nested values use double
//! underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use nextstep_engine::config::EngineConfig;
//!
//! let config = EngineConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Chain order: {}", config.providers.order);
//! ```

mod error;
mod pipeline;
mod providers;

pub use error::{ConfigError, ValidationError};
pub use pipeline::PipelineConfig;
pub use providers::ProvidersConfig;

use serde::Deserialize;

use crate::domain::ScoringConfig;

/// Root engine configuration
///
/// Contains all configuration sections for the guide-generation engine.
/// Load using [`EngineConfig::load()`] which reads from environment
/// variables; every section has working defaults, so an empty environment
/// loads but fails validation for lack of provider keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Provider keys, chain order, and model ladders
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Candidate counts, concurrency, and timeouts
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Candidate scoring weights and thresholds
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `NEXTSTEP` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `NEXTSTEP__PROVIDERS__GEMINI_API_KEY=...` -> `providers.gemini_api_key`
    /// - `NEXTSTEP__PIPELINE__CANDIDATES=5` -> `pipeline.candidates = 5`
    /// - `NEXTSTEP__SCORING__MIN_CONFIDENCE=0.6` -> `scoring.min_confidence = 0.6`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("NEXTSTEP")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Performs semantic validation of configuration:
    /// - At least one provider with an API key, all order entries known
    /// - Candidate count, concurrency, and timeouts above zero
    /// - Scoring weights finite and thresholds in range
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.providers.validate()?;
        self.pipeline.validate()?;
        self.scoring.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to set environment variables for testing
    /// Uses double underscores to separate nested config values
    fn set_minimal_env() {
        env::set_var("NEXTSTEP__PROVIDERS__GEMINI_API_KEY", "test-gemini-key");
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        env::remove_var("NEXTSTEP__PROVIDERS__GEMINI_API_KEY");
        env::remove_var("NEXTSTEP__PROVIDERS__ORDER");
        env::remove_var("NEXTSTEP__PIPELINE__CANDIDATES");
        env::remove_var("NEXTSTEP__PIPELINE__RUN_TIMEOUT_SECS");
        env::remove_var("NEXTSTEP__SCORING__MIN_CONFIDENCE");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = EngineConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(
            config.providers.gemini_api_key.as_deref(),
            Some("test-gemini-key")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pipeline_defaults_apply() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = EngineConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.pipeline.candidates, 3);
        assert_eq!(config.pipeline.run_timeout_secs, 180);
        assert!(config.pipeline.grounding);
    }

    #[test]
    fn test_custom_pipeline_values() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("NEXTSTEP__PIPELINE__CANDIDATES", "5");
        env::set_var("NEXTSTEP__PIPELINE__RUN_TIMEOUT_SECS", "60");
        let result = EngineConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.pipeline.candidates, 5);
        assert_eq!(config.pipeline.run_timeout_secs, 60);
    }

    #[test]
    fn test_custom_scoring_threshold() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("NEXTSTEP__SCORING__MIN_CONFIDENCE", "0.6");
        let result = EngineConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!((config.scoring.min_confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_empty_environment_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = EngineConfig::default();

        assert!(matches!(
            config.validate(),
            Err(ValidationError::NoProviderConfigured)
        ));
    }

    #[test]
    fn test_custom_order_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("NEXTSTEP__PROVIDERS__ORDER", "openai,gemini");
        let result = EngineConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.providers.order, "openai,gemini");
    }
}
