//! Scripted collaborators for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};

use crate::errors::{LlmError, SearchError};
use crate::llm::{LlmClient, LlmResponse};
use crate::websearch::{SearchClient, SearchHit};

/// One recorded LLM call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmCall {
    /// Model the caller asked for.
    pub model: String,
    /// Prompt as sent.
    pub prompt: String,
}

#[derive(Debug)]
enum Reply {
    Echo,
    Hash,
    Script(Mutex<VecDeque<String>>),
}

/// An LLM client with deterministic replies.
///
/// Replies echo the prompt, hash it, or pop from a script. Any call can be
/// made to fail with [`fail_on_call`](Self::fail_on_call).
#[derive(Debug)]
pub struct ScriptedLlmClient {
    reply: Reply,
    failures: Mutex<HashMap<usize, LlmError>>,
    calls: Mutex<Vec<LlmCall>>,
}

impl ScriptedLlmClient {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Replies with the prompt itself.
    #[must_use]
    pub fn echo() -> Self {
        Self::with_reply(Reply::Echo)
    }

    /// Replies with `"REFINED:"` followed by a hash of the prompt.
    #[must_use]
    pub fn hashing() -> Self {
        Self::with_reply(Reply::Hash)
    }

    /// Replies with `responses` in order, then fails with `InvalidResponse`.
    #[must_use]
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = responses.into_iter().map(Into::into).collect();
        Self::with_reply(Reply::Script(Mutex::new(queue)))
    }

    /// Makes the `call`-th call (1-based) fail with `error`.
    #[must_use]
    pub fn fail_on_call(self, call: usize, error: LlmError) -> Self {
        self.failures.lock().insert(call, error);
        self
    }

    /// The reply [`hashing`](Self::hashing) gives for `prompt`.
    #[must_use]
    pub fn hash_reply(prompt: &str) -> String {
        let digest = Sha256::digest(prompt.as_bytes());
        format!("REFINED:{}", &hex::encode(digest)[..16])
    }

    /// Returns every call made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<LlmCall> {
        self.calls.lock().clone()
    }

    /// Returns the number of calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the prompts sent so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.prompt.clone()).collect()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, model: &str, prompt: &str) -> Result<LlmResponse, LlmError> {
        let call = {
            let mut calls = self.calls.lock();
            calls.push(LlmCall {
                model: model.to_string(),
                prompt: prompt.to_string(),
            });
            calls.len()
        };

        if let Some(error) = self.failures.lock().remove(&call) {
            return Err(error);
        }

        let content = match &self.reply {
            Reply::Echo => prompt.to_string(),
            Reply::Hash => Self::hash_reply(prompt),
            Reply::Script(queue) => queue
                .lock()
                .pop_front()
                .ok_or_else(|| LlmError::invalid_response("script exhausted"))?,
        };

        Ok(LlmResponse::text(content, model))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// A search client with fixed results.
#[derive(Debug)]
pub struct ScriptedSearchClient {
    hits: Vec<SearchHit>,
    always_empty: bool,
    failures: Mutex<HashMap<usize, SearchError>>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedSearchClient {
    /// Returns `hits` for every query.
    #[must_use]
    pub fn with_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            always_empty: false,
            failures: Mutex::new(HashMap::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Returns one generic hit per query, derived from the query text.
    #[must_use]
    pub fn echo() -> Self {
        Self::with_hits(Vec::new())
    }

    /// Fails every query with `NoResults`.
    #[must_use]
    pub fn no_results() -> Self {
        Self {
            always_empty: true,
            ..Self::echo()
        }
    }

    /// Makes the `call`-th query (1-based) fail with `error`.
    #[must_use]
    pub fn fail_on_call(self, call: usize, error: SearchError) -> Self {
        self.failures.lock().insert(call, error);
        self
    }

    /// Returns the queries received so far.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl SearchClient for ScriptedSearchClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let call = {
            let mut queries = self.queries.lock();
            queries.push(query.to_string());
            queries.len()
        };

        if self.always_empty {
            return Err(SearchError::no_results(query));
        }
        if let Some(error) = self.failures.lock().remove(&call) {
            return Err(error);
        }

        if self.hits.is_empty() {
            return Ok(vec![SearchHit::new(
                format!("Result for {query}"),
                format!("Background on {query}"),
                format!("https://example.com/search/{call}"),
            )]);
        }
        Ok(self.hits.clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
