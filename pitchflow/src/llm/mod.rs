//! LLM collaborator abstraction.
//!
//! The pipeline only needs one call: prompt in, text out. This module defines
//! that contract, its configuration, and an HTTP implementation.

mod client;
mod config;
#[cfg(feature = "http")]
mod gemini;

pub use client::{LlmClient, LlmResponse};
pub use config::LlmConfig;
#[cfg(feature = "http")]
pub use gemini::GeminiClient;
#[cfg(test)]
pub use client::MockLlmClient;
