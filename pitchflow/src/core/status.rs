//! Stage capability, stage status and run state enums.

use super::StageFailure;
use serde::{Deserialize, Serialize};
use std::fmt;

/// External tool capability a stage may invoke before calling the LLM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StageCapability {
    /// The stage only calls the LLM.
    #[default]
    None,
    /// The stage searches the web and folds the results into its prompt.
    WebSearch,
}

impl fmt::Display for StageCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::WebSearch => write!(f, "web_search"),
        }
    }
}

/// The outcome of a single executed stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Stage produced its output key.
    Ok,
    /// Stage failed and aborted the run.
    Fail,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Lifecycle of one pipeline run.
///
/// `NotStarted -> Running(1) -> Running(2) -> ... -> Completed`, or
/// `Running(k) -> Failed(k, cause)`. Stage indices are 1-based and only ever
/// move forward by one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    /// No stage has started yet.
    #[default]
    NotStarted,
    /// The stage at `stage_index` is executing.
    Running {
        /// 1-based index of the executing stage.
        stage_index: usize,
    },
    /// Every stage produced its output.
    Completed,
    /// A stage failed and the run was aborted.
    Failed(StageFailure),
}

impl RunState {
    /// Returns true for `Completed` and `Failed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }

    /// Returns the index of the running or failed stage.
    #[must_use]
    pub fn stage_index(&self) -> Option<usize> {
        match self {
            Self::Running { stage_index } => Some(*stage_index),
            Self::Failed(failure) => Some(failure.stage_index),
            Self::NotStarted | Self::Completed => None,
        }
    }

    /// Checks whether moving from `self` to `next` is a legal transition.
    #[must_use]
    pub fn can_transition_to(&self, next: &Self) -> bool {
        match (self, next) {
            (Self::NotStarted, Self::Running { stage_index }) => *stage_index == 1,
            (Self::Running { stage_index: current }, Self::Running { stage_index: next }) => {
                *next == current + 1
            }
            (Self::Running { .. }, Self::Completed) => true,
            (Self::Running { stage_index }, Self::Failed(failure)) => {
                failure.stage_index == *stage_index
            }
            _ => false,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::Running { stage_index } => write!(f, "running({stage_index})"),
            Self::Completed => write!(f, "completed"),
            Self::Failed(failure) => {
                write!(f, "failed({}, {})", failure.stage_index, failure.cause.kind())
            }
        }
    }
}
