//! Failure descriptor for an aborted run.

use crate::errors::{DataConflictError, LlmError, SearchError, TemplateResolutionError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a stage failed.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "error", rename_all = "snake_case")]
pub enum FailureCause {
    /// The prompt (or search query) template could not be rendered.
    #[error("{0}")]
    Template(#[from] TemplateResolutionError),

    /// The search collaborator failed.
    #[error("{0}")]
    Search(#[from] SearchError),

    /// The LLM collaborator failed.
    #[error("{0}")]
    Llm(#[from] LlmError),

    /// The stage output key was already present in the context.
    #[error("{0}")]
    Context(#[from] DataConflictError),
}

impl FailureCause {
    /// Short name of the error family, as used in failure descriptors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Template(_) => "TemplateResolutionError",
            Self::Search(_) => "SearchError",
            Self::Llm(_) => "LLMError",
            Self::Context(_) => "DataConflictError",
        }
    }
}

/// Names the stage that aborted a run and the underlying cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFailure {
    /// 1-based position of the failed stage.
    pub stage_index: usize,
    /// Name of the failed stage.
    pub stage_name: String,
    /// Output key the stage would have written.
    pub output_key: String,
    /// The underlying error.
    pub cause: FailureCause,
}

impl std::fmt::Display for StageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "stage {} '{}' failed with {}: {}",
            self.stage_index,
            self.stage_name,
            self.cause.kind(),
            self.cause
        )
    }
}
