//! Core domain model types for pitchflow.
//!
//! This module contains:
//! - Stage capability and status enums
//! - The run state machine
//! - Stage execution records and failure descriptors

mod failure;
mod record;
mod status;

pub use failure::{FailureCause, StageFailure};
pub use record::StageRecord;
pub use status::{RunState, StageCapability, StageStatus};
