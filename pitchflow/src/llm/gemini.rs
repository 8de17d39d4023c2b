//! Gemini `generateContent` client.

use super::{LlmClient, LlmConfig, LlmResponse};
use crate::errors::LlmError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error};

/// LLM client for the Generative Language REST API.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout_seconds: u64,
    temperature: Option<f32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

impl GeminiClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Transport` if no API key is configured or the HTTP
    /// client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| LlmError::transport("no Gemini API key configured"))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("pitchflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LlmError::transport(e.to_string()))?;

        debug!(endpoint = %config.endpoint, "Creating Gemini client");

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            timeout_seconds: config.timeout().as_secs(),
            temperature: config.temperature,
        })
    }

    fn map_send_error(&self, err: &reqwest::Error) -> LlmError {
        if err.is_timeout() {
            error!("Gemini request timed out after {}s", self.timeout_seconds);
            LlmError::Timeout {
                seconds: self.timeout_seconds,
            }
        } else {
            error!("Gemini request failed: {}", err);
            LlmError::transport(err.to_string())
        }
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, model: &str, prompt: &str) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();
        let url = format!("{}/models/{}:generateContent", self.endpoint, model);
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: self
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(&e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(LlmError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Gemini API error: {}", message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.map_send_error(&e)
                } else {
                    LlmError::invalid_response(format!("malformed body: {e}"))
                }
            })?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::invalid_response("no candidates returned"))?;

        let content: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(LlmError::invalid_response(format!(
                "empty completion (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        debug!(
            model = %model,
            latency_ms = start.elapsed().as_secs_f64() * 1000.0,
            chars = content.len(),
            "Gemini completion received"
        );

        let usage = parsed.usage_metadata;
        Ok(LlmResponse {
            content,
            model: model.to_string(),
            input_tokens: usage.as_ref().and_then(|u| u.prompt_token_count),
            output_tokens: usage.as_ref().and_then(|u| u.candidates_token_count),
            finish_reason: candidate.finish_reason,
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
