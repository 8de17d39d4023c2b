//! Testing utilities for pitchflow pipelines.
//!
//! This module provides:
//! - Scripted LLM and search clients that record their calls
//! - Assertions over run results
//! - Small pipeline fixtures

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_context_keys, assert_artifacts_non_empty, assert_run_completed, assert_run_failed_at,
};
pub use fixtures::{linear_pipeline, DOG_WALKER_IDEA};
pub use mocks::{LlmCall, ScriptedLlmClient, ScriptedSearchClient};
