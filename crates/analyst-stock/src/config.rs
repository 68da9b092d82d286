//! Configuration for the analysis pipeline

use crate::error::{AnalystError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the analysis pipeline
///
/// Constructed once at process start and passed by `Arc` into each
/// component; business logic never reads the environment itself. The two
/// handling paths carry independent deadlines and token budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalystConfig {
    /// LLM model id used for every completion
    pub model: String,

    /// Anthropic API key (optional until the provider is built)
    pub anthropic_api_key: Option<String>,

    /// Alpha Vantage API key (optional until the data client is built)
    pub alpha_vantage_api_key: Option<String>,

    /// Deadline for the tool-rich "specific" path
    pub specific_timeout: Duration,

    /// Deadline for the lighter "general" path
    pub general_timeout: Duration,

    /// Response-token budget for the "specific" path
    pub specific_max_tokens: usize,

    /// Response-token budget for the "general" path
    pub general_max_tokens: usize,

    /// Deadline for the classification call
    pub classify_timeout: Duration,

    /// Response-token budget for the classification call
    pub classify_max_tokens: usize,

    /// Transport timeout for data-provider requests
    pub request_timeout: Duration,

    /// Data-provider requests allowed per minute (free tier: 5)
    pub rate_limit_per_minute: u32,

    /// Directory CSV artifacts are written to
    pub output_dir: PathBuf,
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5-20250929".to_string(),
            anthropic_api_key: None,
            alpha_vantage_api_key: None,
            specific_timeout: Duration::from_secs(120),
            general_timeout: Duration::from_secs(60),
            specific_max_tokens: 2500,
            general_max_tokens: 1000,
            classify_timeout: Duration::from_secs(30),
            classify_max_tokens: 500,
            request_timeout: Duration::from_secs(30),
            rate_limit_per_minute: 5,
            output_dir: PathBuf::from("."),
        }
    }
}

impl AnalystConfig {
    /// Create a new configuration builder
    pub fn builder() -> AnalystConfigBuilder {
        AnalystConfigBuilder::default()
    }

    /// Load API keys from the environment
    ///
    /// Reads `ANTHROPIC_API_KEY` and `ALPHA_VANTAGE_API_KEY`; missing
    /// variables leave the fields unset.
    pub fn with_env_keys(mut self) -> Self {
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            self.anthropic_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("ALPHA_VANTAGE_API_KEY") {
            self.alpha_vantage_api_key = Some(key);
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.specific_max_tokens == 0 || self.general_max_tokens == 0 {
            return Err(AnalystError::Config(
                "token budgets must be greater than 0".to_string(),
            ));
        }

        if self.specific_timeout.is_zero() || self.general_timeout.is_zero() {
            return Err(AnalystError::Config(
                "dispatch timeouts must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit_per_minute == 0 {
            return Err(AnalystError::Config(
                "rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`AnalystConfig`]
#[derive(Debug, Default)]
pub struct AnalystConfigBuilder {
    model: Option<String>,
    anthropic_api_key: Option<String>,
    alpha_vantage_api_key: Option<String>,
    specific_timeout: Option<Duration>,
    general_timeout: Option<Duration>,
    specific_max_tokens: Option<usize>,
    general_max_tokens: Option<usize>,
    classify_timeout: Option<Duration>,
    classify_max_tokens: Option<usize>,
    request_timeout: Option<Duration>,
    rate_limit_per_minute: Option<u32>,
    output_dir: Option<PathBuf>,
}

impl AnalystConfigBuilder {
    /// Set the LLM model id
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the Anthropic API key
    pub fn anthropic_api_key(mut self, key: impl Into<String>) -> Self {
        self.anthropic_api_key = Some(key.into());
        self
    }

    /// Set the Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set the deadline for the "specific" path
    pub fn specific_timeout(mut self, timeout: Duration) -> Self {
        self.specific_timeout = Some(timeout);
        self
    }

    /// Set the deadline for the "general" path
    pub fn general_timeout(mut self, timeout: Duration) -> Self {
        self.general_timeout = Some(timeout);
        self
    }

    /// Set the token budget for the "specific" path
    pub fn specific_max_tokens(mut self, max_tokens: usize) -> Self {
        self.specific_max_tokens = Some(max_tokens);
        self
    }

    /// Set the token budget for the "general" path
    pub fn general_max_tokens(mut self, max_tokens: usize) -> Self {
        self.general_max_tokens = Some(max_tokens);
        self
    }

    /// Set the deadline for the classification call
    pub fn classify_timeout(mut self, timeout: Duration) -> Self {
        self.classify_timeout = Some(timeout);
        self
    }

    /// Set the token budget for the classification call
    pub fn classify_max_tokens(mut self, max_tokens: usize) -> Self {
        self.classify_max_tokens = Some(max_tokens);
        self
    }

    /// Set the transport timeout for data-provider requests
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the data-provider rate limit
    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = Some(limit);
        self
    }

    /// Set the artifact output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AnalystConfig> {
        let defaults = AnalystConfig::default();

        let config = AnalystConfig {
            model: self.model.unwrap_or(defaults.model),
            anthropic_api_key: self.anthropic_api_key,
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            specific_timeout: self.specific_timeout.unwrap_or(defaults.specific_timeout),
            general_timeout: self.general_timeout.unwrap_or(defaults.general_timeout),
            specific_max_tokens: self
                .specific_max_tokens
                .unwrap_or(defaults.specific_max_tokens),
            general_max_tokens: self
                .general_max_tokens
                .unwrap_or(defaults.general_max_tokens),
            classify_timeout: self.classify_timeout.unwrap_or(defaults.classify_timeout),
            classify_max_tokens: self
                .classify_max_tokens
                .unwrap_or(defaults.classify_max_tokens),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            rate_limit_per_minute: self
                .rate_limit_per_minute
                .unwrap_or(defaults.rate_limit_per_minute),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
        };

        config.validate()?;
        Ok(config)
    }
}
