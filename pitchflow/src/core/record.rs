//! Per-stage execution record.

use super::{StageCapability, StageStatus};
use serde::{Deserialize, Serialize};

/// What happened when a stage ran.
///
/// Records are kept for every stage that started, including the one that
/// failed, so a caller can see how far a run got and where time was spent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    /// 1-based position of the stage.
    pub stage_index: usize,
    /// The stage name.
    pub stage_name: String,
    /// The context key the stage writes.
    pub output_key: String,
    /// Model identifier the stage used.
    pub model: String,
    /// Capability the stage declared.
    pub capability: StageCapability,
    /// Outcome of the stage.
    pub status: StageStatus,
    /// Number of search hits folded into the prompt.
    #[serde(default)]
    pub search_hits: usize,
    /// Length of the rendered prompt in characters.
    #[serde(default)]
    pub prompt_chars: usize,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: f64,
    /// Prompt tokens reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,
    /// Completion tokens reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,
}

impl StageRecord {
    /// Returns true if the stage produced its output.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == StageStatus::Ok
    }
}
