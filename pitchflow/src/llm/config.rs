//! Configuration for the LLM collaborator.

use crate::errors::ConfigError;
use crate::pipeline::DEFAULT_MODEL;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for LLM calls.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    /// Model used by stages without an override.
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL of the Generative Language API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// Sampling temperature.
    #[serde(default)]
    pub temperature: Option<f32>,
    /// API key. Usually supplied through the environment instead.
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

/// Upper bound for `timeout_seconds`.
pub const MAX_TIMEOUT_SECONDS: f64 = 3600.0;

fn default_timeout() -> f64 {
    60.0
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout(),
            temperature: None,
            api_key: None,
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl LlmConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Gets timeout as Duration.
    ///
    /// Falls back to the default timeout when `timeout_seconds` is not a
    /// representable duration; `validate` reports such values.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_seconds)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or_else(|| Duration::from_secs_f64(default_timeout()))
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::invalid("llm.model", "must not be empty"));
        }
        if !(self.timeout_seconds > 0.0 && self.timeout_seconds <= MAX_TIMEOUT_SECONDS) {
            return Err(ConfigError::invalid(
                "llm.timeout_seconds",
                format!("must be greater than 0 and at most {MAX_TIMEOUT_SECONDS}"),
            ));
        }
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::invalid(
                    "llm.temperature",
                    "must be between 0.0 and 2.0",
                ));
            }
        }
        Ok(())
    }
}
