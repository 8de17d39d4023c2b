//! Run-level event emission.
//!
//! The runner reports progress through an `EventSink` passed to it
//! explicitly. Event types are dotted strings; payloads are JSON objects that
//! always carry `pipeline_run_id`.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// A run began.
pub const PIPELINE_STARTED: &str = "pipeline.started";
/// A run finished with every stage completed.
pub const PIPELINE_COMPLETED: &str = "pipeline.completed";
/// A run was aborted by a stage failure.
pub const PIPELINE_FAILED: &str = "pipeline.failed";
/// A stage began.
pub const STAGE_STARTED: &str = "stage.started";
/// A stage's search call returned hits.
pub const STAGE_SEARCH_COMPLETED: &str = "stage.search_completed";
/// A stage stored its output.
pub const STAGE_COMPLETED: &str = "stage.completed";
/// A stage failed.
pub const STAGE_FAILED: &str = "stage.failed";
