//! Assertions over run results.

use crate::core::RunState;
use crate::pipeline::RunResult;

/// Asserts that every stage completed.
pub fn assert_run_completed(result: &RunResult) {
    assert!(
        matches!(result.state, RunState::Completed),
        "Expected completed run, got state: {}",
        result.state
    );
}

/// Asserts that the run failed at `stage_index` with a cause of `kind`
/// (e.g. `"SearchError"`).
pub fn assert_run_failed_at(result: &RunResult, stage_index: usize, kind: &str) {
    let Some(failure) = result.failure() else {
        panic!("Expected failed run, got state: {}", result.state);
    };
    assert_eq!(
        (failure.stage_index, failure.cause.kind()),
        (stage_index, kind),
        "Unexpected failure: {failure}"
    );
}

/// Asserts the exact context keys, in insertion order.
pub fn assert_context_keys(result: &RunResult, expected: &[&str]) {
    let keys: Vec<&str> = result.context.keys().collect();
    assert_eq!(keys, expected, "Context keys differ");
}

/// Asserts that every produced artifact is non-empty.
pub fn assert_artifacts_non_empty(result: &RunResult) {
    for (key, value) in result.artifacts() {
        assert!(!value.trim().is_empty(), "Artifact '{key}' is empty");
    }
}
