//! Google Custom Search JSON API client.

use super::{SearchClient, SearchConfig, SearchHit};
use crate::errors::SearchError;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

/// Search client backed by the Custom Search JSON API.
pub struct GoogleSearchClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    engine_id: String,
    max_results: usize,
    timeout_seconds: u64,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Deserialize)]
struct Item {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
}

impl From<Item> for SearchHit {
    fn from(item: Item) -> Self {
        Self {
            title: item.title,
            snippet: item.snippet,
            url: item.link,
        }
    }
}

impl GoogleSearchClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Unavailable` when credentials are missing and
    /// `SearchError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        if !config.has_credentials() {
            return Err(SearchError::Unavailable);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("pitchflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SearchError::transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone().unwrap_or_default(),
            engine_id: config.engine_id.clone().unwrap_or_default(),
            max_results: config.max_results.clamp(1, 10),
            timeout_seconds: config.timeout().as_secs(),
        })
    }

    fn map_send_error(&self, err: &reqwest::Error) -> SearchError {
        if err.is_timeout() {
            error!("Search request timed out after {}s", self.timeout_seconds);
            SearchError::Timeout {
                seconds: self.timeout_seconds,
            }
        } else {
            error!("Search request failed: {}", err);
            SearchError::transport(err.to_string())
        }
    }
}

#[async_trait]
impl SearchClient for GoogleSearchClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let num = self.max_results.to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.map_send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Search API error: {}", message);
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| self.map_send_error(&e))?;

        let hits: Vec<SearchHit> = parsed
            .items
            .into_iter()
            .map(SearchHit::from)
            .filter(|hit| !hit.url.is_empty())
            .take(self.max_results)
            .collect();

        if hits.is_empty() {
            return Err(SearchError::no_results(query));
        }

        debug!(query = %query, hits = hits.len(), "Search completed");
        Ok(hits)
    }

    fn name(&self) -> &str {
        "google_custom_search"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_credentials() {
        let result = GoogleSearchClient::new(&SearchConfig::default());
        assert!(matches!(result, Err(SearchError::Unavailable)));
    }

    #[test]
    fn test_builds_with_credentials() {
        let config = SearchConfig::new()
            .with_credentials("key", "cx")
            .with_max_results(25);
        let client = GoogleSearchClient::new(&config).unwrap();
        assert_eq!(client.max_results, 10);
        assert_eq!(client.name(), "google_custom_search");
    }

    #[test]
    fn test_out_of_range_timeout_falls_back() {
        let config = SearchConfig {
            timeout_seconds: 1e20,
            ..SearchConfig::new().with_credentials("key", "cx")
        };
        let client = GoogleSearchClient::new(&config).unwrap();
        assert_eq!(client.timeout_seconds, 30);
    }

    #[test]
    fn test_response_mapping() {
        let raw = r#"{
            "kind": "customsearch#search",
            "items": [
                {"title": "Rover", "link": "https://rover.com", "snippet": "Book dog walkers"},
                {"title": "No link"}
            ]
        }"#;

        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        let hits: Vec<SearchHit> = parsed.items.into_iter().map(SearchHit::from).collect();
        assert_eq!(hits[0].url, "https://rover.com");
        assert_eq!(hits[0].snippet, "Book dog walkers");
        assert_eq!(hits[1].url, "");
    }

    #[test]
    fn test_missing_items_is_empty() {
        let parsed: SearchResponse = serde_json::from_str(r#"{"kind": "x"}"#).unwrap();
        assert!(parsed.items.is_empty());
    }
}
