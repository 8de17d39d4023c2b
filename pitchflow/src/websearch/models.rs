//! Data models for search results.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// A single ranked search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result title.
    pub title: String,
    /// Short excerpt of the page.
    #[serde(default)]
    pub snippet: String,
    /// Result URL.
    pub url: String,
}

impl SearchHit {
    /// Creates a new hit.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        snippet: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            url: url.into(),
        }
    }
}

/// Builds the numbered "Web research" section appended to a stage prompt.
///
/// Returns an empty string when `hits` is empty.
#[must_use]
pub fn format_research_section(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return String::new();
    }

    let mut section = format!("\n\nWeb research (query: \"{query}\"):\n");
    for (i, hit) in hits.iter().enumerate() {
        let _ = writeln!(section, "{}. {} ({})", i + 1, hit.title.trim(), hit.url);
        let snippet = hit.snippet.split_whitespace().collect::<Vec<_>>().join(" ");
        if !snippet.is_empty() {
            let _ = writeln!(section, "   {snippet}");
        }
    }
    section
}
