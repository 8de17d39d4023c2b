//! Web search collaborator.
//!
//! This module provides:
//! - The `SearchHit` model and the prompt section built from hits
//! - Configuration for the search backend
//! - The `SearchClient` trait
//! - A Google Custom Search implementation (feature `http`)

mod config;
#[cfg(feature = "http")]
mod google;
mod models;
mod protocols;

pub use config::SearchConfig;
#[cfg(feature = "http")]
pub use google::GoogleSearchClient;
pub use models::{format_research_section, SearchHit};
pub use protocols::SearchClient;
#[cfg(test)]
pub use protocols::MockSearchClient;
