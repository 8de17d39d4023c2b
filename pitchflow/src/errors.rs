//! Error types for the pitchflow pipeline.
//!
//! Configuration problems are detected eagerly when a pipeline is defined.
//! Everything else (template resolution, LLM and search failures) surfaces
//! at run time as the cause of a failed stage.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for pitchflow operations.
#[derive(Debug, Error)]
pub enum PitchflowError {
    /// The pipeline definition is invalid.
    #[error("{0}")]
    Validation(#[from] PipelineValidationError),

    /// The configuration could not be loaded or is invalid.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// A template referenced a key that is not in the context.
    #[error("{0}")]
    Template(#[from] TemplateResolutionError),

    /// A context key was written twice.
    #[error("{0}")]
    DataConflict(#[from] DataConflictError),

    /// The LLM collaborator failed.
    #[error("{0}")]
    Llm(#[from] LlmError),

    /// The search collaborator failed.
    #[error("{0}")]
    Search(#[from] SearchError),
}

/// Metadata about a definition error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "PIPELINE-003-UNRESOLVED_KEY").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Fills in the default fix hint for the code if none was set.
    #[must_use]
    pub fn with_default_hint(self) -> Self {
        if self.fix_hint.is_some() {
            return self;
        }
        match ContractSuggestions::get(&self.code) {
            Some(hint) => self.with_fix_hint(hint),
            None => self,
        }
    }
}

/// Error raised when a pipeline definition is rejected.
///
/// This is the `ConfigurationError` of the pipeline contract: it is only ever
/// produced while defining a pipeline, never while running one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<String>,
    /// Optional contract error info.
    pub error_info: Option<ContractErrorInfo>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
            error_info: None,
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }

    /// Sets the contract error info.
    #[must_use]
    pub fn with_error_info(mut self, info: ContractErrorInfo) -> Self {
        self.error_info = Some(info.with_default_hint());
        self
    }

    /// Returns the error code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.error_info.as_ref().map(|info| info.code.as_str())
    }
}

/// Error raised when a template placeholder has no value in the context.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("template references missing context key '{key}'")]
pub struct TemplateResolutionError {
    /// The unresolved placeholder.
    pub key: String,
}

impl TemplateResolutionError {
    /// Creates a new template resolution error.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Error raised when writing to an existing key in the shared context.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("Data conflict: key '{key}' already exists")]
pub struct DataConflictError {
    /// The conflicting key.
    pub key: String,
}

impl DataConflictError {
    /// Creates a new data conflict error.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Failures of the LLM collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LlmError {
    /// The request did not complete in time.
    #[error("LLM request timed out after {seconds}s")]
    Timeout {
        /// Timeout that elapsed, in seconds.
        seconds: u64,
    },

    /// The provider refused the request because of rate limits.
    #[error("LLM provider rate limited the request")]
    RateLimited {
        /// Seconds to wait before retrying, when the provider says so.
        retry_after: Option<u64>,
    },

    /// The provider answered but the answer is unusable (empty, malformed).
    #[error("invalid LLM response: {message}")]
    InvalidResponse {
        /// What was wrong with the response.
        message: String,
    },

    /// The provider returned a non-success status.
    #[error("LLM API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The request could not be sent (connection, TLS, client setup).
    #[error("LLM transport error: {message}")]
    Transport {
        /// Underlying error text.
        message: String,
    },
}

impl LlmError {
    /// Creates an invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Failures of the search collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchError {
    /// The request did not complete in time.
    #[error("search request timed out after {seconds}s")]
    Timeout {
        /// Timeout that elapsed, in seconds.
        seconds: u64,
    },

    /// The search returned nothing for the query.
    #[error("search returned no results for '{query}'")]
    NoResults {
        /// The query that came back empty.
        query: String,
    },

    /// The provider returned a non-success status.
    #[error("search API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The request could not be sent.
    #[error("search transport error: {message}")]
    Transport {
        /// Underlying error text.
        message: String,
    },

    /// A stage needs search but the runner has no search client.
    #[error("no search client is configured")]
    Unavailable,
}

impl SearchError {
    /// Creates a no-results error.
    #[must_use]
    pub fn no_results(query: impl Into<String>) -> Self {
        Self::NoResults {
            query: query.into(),
        }
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for the schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range or inconsistent.
    #[error("invalid config value for '{field}': {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Provides default suggestions for definition error codes.
pub struct ContractSuggestions;

impl ContractSuggestions {
    /// Code for a pipeline with no stages.
    pub const EMPTY: &'static str = "PIPELINE-001-EMPTY";
    /// Code for two stages writing the same key.
    pub const DUPLICATE_OUTPUT: &'static str = "PIPELINE-002-DUPLICATE_OUTPUT";
    /// Code for a placeholder nothing produces.
    pub const UNRESOLVED_KEY: &'static str = "PIPELINE-003-UNRESOLVED_KEY";
    /// Code for a placeholder produced at the same or a later position.
    pub const FORWARD_REF: &'static str = "PIPELINE-004-FORWARD_REF";
    /// Code for two stages with the same name.
    pub const DUPLICATE_NAME: &'static str = "PIPELINE-005-DUPLICATE_NAME";
    /// Code for a stage writing the reserved input key.
    pub const RESERVED_KEY: &'static str = "PIPELINE-006-RESERVED_KEY";
    /// Code for a search query on a stage without search.
    pub const SEARCH_QUERY: &'static str = "PIPELINE-007-SEARCH_QUERY";
    /// Code for a blank name or output key.
    pub const BLANK: &'static str = "PIPELINE-008-BLANK";
    /// Code for a configuration naming a stage that does not exist.
    pub const UNKNOWN_STAGE: &'static str = "PIPELINE-009-UNKNOWN_STAGE";

    /// Gets a suggestion for a given error code.
    #[must_use]
    pub fn get(code: &str) -> Option<&'static str> {
        match code {
            Self::EMPTY => Some("Add at least one stage to the pipeline before building."),
            Self::DUPLICATE_OUTPUT => Some(
                "Every stage writes exactly one context key. \
                 Rename one of the output keys.",
            ),
            Self::UNRESOLVED_KEY => Some(
                "Placeholders may only name the initial input or an output key \
                 of an earlier stage. Check for typos.",
            ),
            Self::FORWARD_REF => Some(
                "Move the producing stage before the stage that reads its output, \
                 or drop the placeholder.",
            ),
            Self::DUPLICATE_NAME => Some("Give every stage a unique name."),
            Self::RESERVED_KEY => Some(
                "The initial input is stored under a reserved key. \
                 Choose a different output key.",
            ),
            Self::SEARCH_QUERY => Some(
                "Enable web search on the stage or remove its search query.",
            ),
            Self::BLANK => Some("Stage names and output keys must not be empty."),
            Self::UNKNOWN_STAGE => Some(
                "Only stages of the pipeline can be configured or ordered. \
                 Check the stage names.",
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_error_info_creation() {
        let info = ContractErrorInfo::new("TEST-001", "Test error")
            .with_fix_hint("Fix this by doing that")
            .with_context_entry("stage", "my_stage");

        assert_eq!(info.code, "TEST-001");
        assert_eq!(info.summary, "Test error");
        assert_eq!(info.fix_hint, Some("Fix this by doing that".to_string()));
        assert_eq!(info.context.get("stage"), Some(&"my_stage".to_string()));
    }

    #[test]
    fn test_validation_error_gets_default_hint() {
        let err = PipelineValidationError::new("dup").with_error_info(ContractErrorInfo::new(
            ContractSuggestions::DUPLICATE_OUTPUT,
            "duplicate",
        ));

        assert_eq!(err.code(), Some(ContractSuggestions::DUPLICATE_OUTPUT));
        assert!(err.error_info.unwrap().fix_hint.is_some());
    }

    #[test]
    fn test_explicit_hint_is_kept() {
        let info = ContractErrorInfo::new(ContractSuggestions::EMPTY, "empty")
            .with_fix_hint("custom")
            .with_default_hint();
        assert_eq!(info.fix_hint.as_deref(), Some("custom"));
    }

    #[test]
    fn test_llm_error_serializes_with_kind() {
        let err = LlmError::RateLimited {
            retry_after: Some(30),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "rate_limited");
        assert_eq!(json["retry_after"], 30);
    }

    #[test]
    fn test_search_error_display() {
        let err = SearchError::no_results("dog walking market");
        assert_eq!(
            err.to_string(),
            "search returned no results for 'dog walking market'"
        );
    }

    #[test]
    fn test_pitchflow_error_from_conversions() {
        let err: PitchflowError = TemplateResolutionError::new("problem").into();
        assert!(matches!(err, PitchflowError::Template(_)));
        assert!(err.to_string().contains("problem"));

        let err: PitchflowError = LlmError::Timeout { seconds: 5 }.into();
        assert!(matches!(err, PitchflowError::Llm(_)));
    }

    #[test]
    fn test_contract_suggestions() {
        assert!(ContractSuggestions::get(ContractSuggestions::FORWARD_REF).is_some());
        assert!(ContractSuggestions::get("UNKNOWN").is_none());
    }
}
