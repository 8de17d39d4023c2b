//! Protocol trait for the search backend.

use super::SearchHit;
use crate::errors::SearchError;
use async_trait::async_trait;

/// A client that turns a query into ranked results.
///
/// Implementations should return `SearchError::NoResults` rather than an
/// empty list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Runs `query` and returns hits, best first.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError>;

    /// Name of the backend, for logs.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_automock_search() {
        let mut client = MockSearchClient::new();
        client
            .expect_search()
            .withf(|query| query.contains("competitors"))
            .returning(|query| Err(SearchError::no_results(query.to_string())));

        let err = client.search("dog app competitors").await.unwrap_err();
        assert!(matches!(err, SearchError::NoResults { .. }));
    }
}
