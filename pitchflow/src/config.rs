//! Runtime configuration.
//!
//! Values are layered: an optional TOML file, then environment variables,
//! then whatever the caller sets explicitly (the CLI applies its flags last).
//!
//! ```toml
//! stage_order = ["clarify_idea", "problem_statement", "pitch_deck"]
//!
//! [llm]
//! model = "gemini-2.0-flash"
//! timeout_seconds = 90.0
//!
//! [search]
//! enabled = true
//! max_results = 5
//!
//! [stages.competitor_analysis]
//! model = "gemini-2.0-pro"
//! search = false
//! ```

use crate::errors::ConfigError;
use crate::llm::LlmConfig;
use crate::websearch::SearchConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Overrides the default model.
pub const ENV_MODEL: &str = "PITCHFLOW_MODEL";
/// Gemini API key; takes precedence over `GOOGLE_API_KEY`.
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
/// Fallback Gemini API key.
pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
/// Custom Search API key.
pub const ENV_SEARCH_API_KEY: &str = "GOOGLE_SEARCH_API_KEY";
/// Custom Search engine id.
pub const ENV_SEARCH_ENGINE_ID: &str = "GOOGLE_SEARCH_ENGINE_ID";
/// Enables or disables web search (`true`/`false`, `1`/`0`, `yes`/`no`).
pub const ENV_SEARCH_ENABLED: &str = "PITCHFLOW_SEARCH_ENABLED";

/// Per-stage adjustments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageOverride {
    /// Model for this stage only.
    #[serde(default)]
    pub model: Option<String>,
    /// Turns web search on or off for this stage.
    #[serde(default)]
    pub search: Option<bool>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PitchflowConfig {
    /// LLM settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Search settings.
    #[serde(default)]
    pub search: SearchConfig,
    /// Per-stage overrides keyed by stage name.
    #[serde(default)]
    pub stages: BTreeMap<String, StageOverride>,
    /// Stage names to run, in order. Defaults to the canonical order.
    #[serde(default)]
    pub stage_order: Option<Vec<String>>,
}

impl PitchflowConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML or unknown fields.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read and
    /// `ConfigError::Parse` if it is not valid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_toml_str(&text)
    }

    /// Applies overrides from the process environment.
    ///
    /// # Errors
    ///
    /// See [`with_env_overrides`](Self::with_env_overrides).
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides read through `lookup`. Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `PITCHFLOW_SEARCH_ENABLED` is not a
    /// boolean.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(model) = get(ENV_MODEL) {
            self.llm.model = model;
        }
        if let Some(key) = get(ENV_GEMINI_API_KEY).or_else(|| get(ENV_GOOGLE_API_KEY)) {
            self.llm.api_key = Some(key);
        }
        if let Some(key) = get(ENV_SEARCH_API_KEY) {
            self.search.api_key = Some(key);
        }
        if let Some(id) = get(ENV_SEARCH_ENGINE_ID) {
            self.search.engine_id = Some(id);
        }
        if let Some(raw) = get(ENV_SEARCH_ENABLED) {
            self.search.enabled = parse_bool(&raw).ok_or_else(|| {
                ConfigError::invalid(ENV_SEARCH_ENABLED, format!("'{raw}' is not a boolean"))
            })?;
        }
        Ok(self)
    }

    /// Returns the override for a stage, if any.
    #[must_use]
    pub fn stage_override(&self, stage: &str) -> Option<&StageOverride> {
        self.stages.get(stage)
    }

    /// Checks value ranges. Stage names are checked when the pipeline is built.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.llm.validate()?;
        self.search.validate()?;

        for (name, stage) in &self.stages {
            if stage.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
                return Err(ConfigError::invalid(
                    format!("stages.{name}.model"),
                    "must not be empty",
                ));
            }
        }

        if self.stage_order.as_ref().is_some_and(Vec::is_empty) {
            return Err(ConfigError::invalid(
                "stage_order",
                "must name at least one stage",
            ));
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = PitchflowConfig::from_toml_str("").unwrap();
        assert_eq!(config, PitchflowConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_toml() {
        let config = PitchflowConfig::from_toml_str(
            r#"
            stage_order = ["clarify_idea", "pitch_deck"]

            [llm]
            model = "gemini-2.0-pro"
            timeout_seconds = 90.0

            [search]
            enabled = false
            max_results = 3

            [stages.pitch_deck]
            model = "gemini-2.5-pro"
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.model, "gemini-2.0-pro");
        assert!((config.llm.timeout_seconds - 90.0).abs() < f64::EPSILON);
        assert!(!config.search.enabled);
        assert_eq!(config.search.max_results, 3);
        assert_eq!(
            config.stage_override("pitch_deck").and_then(|s| s.model.as_deref()),
            Some("gemini-2.5-pro")
        );
        assert_eq!(
            config.stage_order,
            Some(vec!["clarify_idea".to_string(), "pitch_deck".to_string()])
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = PitchflowConfig::from_toml_str("[stages.memory]\ntemperature = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_huge_timeout_rejected() {
        let config =
            PitchflowConfig::from_toml_str("[llm]\ntimeout_seconds = 1e20\napi_key = \"k\"")
                .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let config = PitchflowConfig::from_toml_str("[search]\ntimeout_seconds = 1e20").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[llm]\nmodel = \"from-file\"").unwrap();

        let config = PitchflowConfig::load(file.path()).unwrap();
        assert_eq!(config.llm.model, "from-file");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PitchflowConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let config = PitchflowConfig::default()
            .with_env_overrides(env(&[
                (ENV_MODEL, "env-model"),
                (ENV_GOOGLE_API_KEY, "google-key"),
                (ENV_GEMINI_API_KEY, "gemini-key"),
                (ENV_SEARCH_API_KEY, "search-key"),
                (ENV_SEARCH_ENGINE_ID, "cx"),
                (ENV_SEARCH_ENABLED, "no"),
            ]))
            .unwrap();

        assert_eq!(config.llm.model, "env-model");
        assert_eq!(config.llm.api_key.as_deref(), Some("gemini-key"));
        assert!(config.search.has_credentials());
        assert!(!config.search.enabled);
    }

    #[test]
    fn test_blank_env_values_ignored() {
        let config = PitchflowConfig::default()
            .with_env_overrides(env(&[(ENV_MODEL, "  "), (ENV_GOOGLE_API_KEY, "fallback")]))
            .unwrap();

        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert_eq!(config.llm.api_key.as_deref(), Some("fallback"));
    }

    #[test]
    fn test_bad_search_flag() {
        let err = PitchflowConfig::default()
            .with_env_overrides(env(&[(ENV_SEARCH_ENABLED, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_validate_rejects_blank_stage_model_and_empty_order() {
        let mut config = PitchflowConfig::default();
        config.stages.insert(
            "memory".to_string(),
            StageOverride {
                model: Some(String::new()),
                search: None,
            },
        );
        assert!(config.validate().is_err());

        let config = PitchflowConfig {
            stage_order: Some(Vec::new()),
            ..PitchflowConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
