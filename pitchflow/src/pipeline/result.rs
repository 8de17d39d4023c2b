//! Outcome of one pipeline run.

use crate::context::{SharedContext, INITIAL_INPUT_KEY};
use crate::core::{RunState, StageFailure, StageRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// The final state of a run together with everything it produced.
///
/// On failure `context` holds the initial input plus the outputs of every
/// stage before the failing one, and `state` names the stage and its cause.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Unique id of the run.
    pub run_id: Uuid,
    /// Name of the pipeline that ran.
    pub pipeline: String,
    /// Terminal state: `Completed` or `Failed`.
    pub state: RunState,
    /// Context as it stood when the run ended.
    pub context: SharedContext,
    /// One record per stage that started.
    pub stages: Vec<StageRecord>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: f64,
}

impl RunResult {
    /// Returns true if every stage produced its output.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self.state, RunState::Completed)
    }

    /// Returns the failure descriptor, if the run failed.
    #[must_use]
    pub fn failure(&self) -> Option<&StageFailure> {
        match &self.state {
            RunState::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Looks up a produced artifact or the initial input.
    #[must_use]
    pub fn artifact(&self, key: &str) -> Option<&str> {
        self.context.get(key)
    }

    /// Returns the initial input.
    #[must_use]
    pub fn initial_input(&self) -> &str {
        self.context.get(INITIAL_INPUT_KEY).unwrap_or_default()
    }

    /// Returns produced artifacts in production order.
    pub fn artifacts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.context.artifacts()
    }

    /// Returns keys of produced artifacts in production order.
    #[must_use]
    pub fn artifact_keys(&self) -> Vec<&str> {
        self.artifacts().map(|(key, _)| key).collect()
    }

    /// Sum of the token counts reported by the LLM backend.
    #[must_use]
    pub fn total_tokens(&self) -> u64 {
        self.stages
            .iter()
            .map(|r| u64::from(r.input_tokens.unwrap_or(0)) + u64::from(r.output_tokens.unwrap_or(0)))
            .sum()
    }
}
