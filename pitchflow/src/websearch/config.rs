//! Configuration for the search backend.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for web search.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Whether search-capable stages actually search.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Custom Search JSON API endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Number of hits requested per query (1 to 10).
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// API key.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Programmable search engine id (`cx`).
    #[serde(default)]
    pub engine_id: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    "https://www.googleapis.com/customsearch/v1".to_string()
}

fn default_max_results() -> usize {
    5
}

/// Upper bound for `timeout_seconds`.
pub const MAX_TIMEOUT_SECONDS: f64 = 3600.0;

fn default_timeout() -> f64 {
    30.0
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            max_results: default_max_results(),
            timeout_seconds: default_timeout(),
            api_key: None,
            engine_id: None,
        }
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("enabled", &self.enabled)
            .field("endpoint", &self.endpoint)
            .field("max_results", &self.max_results)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("engine_id", &self.engine_id)
            .finish()
    }
}

impl SearchConfig {
    /// Creates a new search configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
    ) -> Self {
        self.api_key = Some(api_key.into());
        self.engine_id = Some(engine_id.into());
        self
    }

    /// Sets the number of hits per query.
    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
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

    /// Whether both the API key and engine id are present.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.api_key) && present(&self.engine_id)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=10).contains(&self.max_results) {
            return Err(ConfigError::invalid(
                "search.max_results",
                "must be between 1 and 10",
            ));
        }
        if !(self.timeout_seconds > 0.0 && self.timeout_seconds <= MAX_TIMEOUT_SECONDS) {
            return Err(ConfigError::invalid(
                "search.timeout_seconds",
                format!("must be greater than 0 and at most {MAX_TIMEOUT_SECONDS}"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert!(config.enabled);
        assert_eq!(config.max_results, 5);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(!config.has_credentials());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_credentials() {
        let config = SearchConfig::new().with_credentials("key", "cx");
        assert!(config.has_credentials());

        let blank = SearchConfig::new().with_credentials("key", " ");
        assert!(!blank.has_credentials());
    }

    #[test]
    fn test_max_results_range() {
        assert!(SearchConfig::new().with_max_results(0).validate().is_err());
        assert!(SearchConfig::new().with_max_results(11).validate().is_err());
        assert!(SearchConfig::new().with_max_results(10).validate().is_ok());
    }

    #[test]
    fn test_partial_deserialize() {
        let config: SearchConfig = serde_json::from_str(r#"{"enabled": false}"#).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.endpoint, default_endpoint());
    }

    #[test]
    fn test_timeout_upper_bound() {
        let config = SearchConfig {
            timeout_seconds: 1e20,
            ..SearchConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "search.timeout_seconds"
        ));
        assert_eq!(config.timeout(), Duration::from_secs(30));

        let config = SearchConfig {
            timeout_seconds: -1.0,
            ..SearchConfig::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }
}
