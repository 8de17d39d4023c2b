//! The LLM collaborator contract.

use crate::errors::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Text produced by an LLM call, with optional usage figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Generated text, untrimmed.
    pub content: String,
    /// Model that produced the text.
    pub model: String,
    /// Prompt tokens, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,
    /// Completion tokens, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,
    /// Provider-specific stop reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl LlmResponse {
    /// Creates a response carrying only text.
    #[must_use]
    pub fn text(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            input_tokens: None,
            output_tokens: None,
            finish_reason: None,
        }
    }

    /// Returns total tokens.
    #[must_use]
    pub fn total_tokens(&self) -> u64 {
        u64::from(self.input_tokens.unwrap_or(0)) + u64::from(self.output_tokens.unwrap_or(0))
    }
}

/// A client that completes a prompt with a given model.
///
/// Implementations own their own timeouts; the runner never cancels a call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends `prompt` to `model` and returns the generated text.
    async fn complete(&self, model: &str, prompt: &str) -> Result<LlmResponse, LlmError>;

    /// Name of the backend, for logs.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_tokens() {
        let mut response = LlmResponse::text("hi", "m");
        assert_eq!(response.total_tokens(), 0);

        response.input_tokens = Some(12);
        response.output_tokens = Some(30);
        assert_eq!(response.total_tokens(), 42);

        response.input_tokens = Some(u32::MAX);
        response.output_tokens = Some(1);
        assert_eq!(response.total_tokens(), u64::from(u32::MAX) + 1);
    }

    #[tokio::test]
    async fn test_automock_client() {
        let mut client = MockLlmClient::new();
        client
            .expect_complete()
            .withf(|model, prompt| model.starts_with("gemini") && prompt.contains("idea"))
            .times(1)
            .returning(|model, _| Ok(LlmResponse::text("refined", model.to_string())));

        let response = client.complete("gemini-2.0-flash", "an idea").await.unwrap();
        assert_eq!(response.content, "refined");
        assert_eq!(response.model, "gemini-2.0-flash");
    }
}
