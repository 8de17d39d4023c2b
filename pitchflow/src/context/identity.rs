//! Run identity for tracking pipeline executions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one pipeline run.
///
/// Every call to `PipelineRunner::run` gets a fresh identity, so concurrent
/// runs of the same pipeline can be told apart in logs and events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentity {
    /// The unique ID for this pipeline run.
    pub pipeline_run_id: Uuid,

    /// Name of the pipeline being run.
    pub pipeline_name: String,

    /// When the run started.
    pub started_at: DateTime<Utc>,
}

impl RunIdentity {
    /// Creates a new run identity with a generated run ID.
    #[must_use]
    pub fn new(pipeline_name: impl Into<String>) -> Self {
        Self::with_pipeline_run_id(pipeline_name, Uuid::new_v4())
    }

    /// Creates a run identity with a specific run ID.
    #[must_use]
    pub fn with_pipeline_run_id(pipeline_name: impl Into<String>, pipeline_run_id: Uuid) -> Self {
        Self {
            pipeline_run_id,
            pipeline_name: pipeline_name.into(),
            started_at: Utc::now(),
        }
    }

    /// Returns the run ID as a string.
    #[must_use]
    pub fn pipeline_run_id_str(&self) -> String {
        self.pipeline_run_id.to_string()
    }
}
