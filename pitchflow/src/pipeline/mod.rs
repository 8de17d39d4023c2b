//! Pipeline definition and execution.
//!
//! This module provides:
//! - Prompt templates with `{key}` placeholders
//! - Stage specifications and the immutable `Pipeline`
//! - A builder that validates key ordering at definition time
//! - The sequential runner and its result type

mod builder;
mod result;
mod runner;
mod spec;
mod template;

pub use crate::core::{FailureCause, StageFailure};
pub use builder::{PipelineBuilder, DEFAULT_MODEL};
pub use result::RunResult;
pub use runner::PipelineRunner;
pub use spec::{Pipeline, StageSpec};
pub use template::PromptTemplate;
