//! # Pitchflow
//!
//! A sequential pipeline of LLM prompt invocations that turns a one-line
//! business idea into an investor-ready pitch deck.
//!
//! Pitchflow provides:
//!
//! - **Stage records**: each stage is a prompt template, an output key and an
//!   optional web-search capability, executed by one generic routine
//! - **Eager validation**: placeholders are checked against earlier output keys
//!   when the pipeline is defined, never at run time
//! - **Explicit per-run context**: every run owns its own growing context
//! - **Pluggable collaborators**: LLM and search clients behind traits, with
//!   HTTP implementations and scripted mocks
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pitchflow::prelude::*;
//! use std::sync::Arc;
//!
//! let pipeline = Arc::new(startup_strategist()?);
//! let runner = PipelineRunner::new(pipeline, llm).with_search(search);
//!
//! let result = runner.run("An app that matches dog walkers with busy pet owners").await;
//! if let Some(deck) = result.artifact("pitch_deck") {
//!     println!("{deck}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod events;
pub mod llm;
pub mod pipeline;
pub mod strategist;
pub mod testing;
pub mod websearch;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{PitchflowConfig, StageOverride};
    pub use crate::context::{RunIdentity, SharedContext, INITIAL_INPUT_KEY};
    pub use crate::core::{RunState, StageCapability, StageRecord, StageStatus};
    pub use crate::errors::{
        ConfigError, ContractErrorInfo, DataConflictError, LlmError, PipelineValidationError,
        PitchflowError, SearchError, TemplateResolutionError,
    };
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::llm::{LlmClient, LlmConfig, LlmResponse};
    pub use crate::pipeline::{
        FailureCause, Pipeline, PipelineBuilder, PipelineRunner, PromptTemplate, RunResult,
        StageFailure, StageSpec,
    };
    pub use crate::strategist::{build_pipeline, startup_strategist, CANONICAL_OUTPUT_KEYS};
    pub use crate::websearch::{SearchClient, SearchConfig, SearchHit};

    #[cfg(feature = "http")]
    pub use crate::llm::GeminiClient;
    #[cfg(feature = "http")]
    pub use crate::websearch::GoogleSearchClient;
}

/// Crate version, as reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
