//! Context management for pipeline execution.
//!
//! This module provides:
//! - The insertion-ordered, grow-only context owned by one run
//! - Run identity for correlating logs and events

mod identity;
mod shared;

pub use identity::RunIdentity;
pub use shared::{SharedContext, INITIAL_INPUT_KEY};
