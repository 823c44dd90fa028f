//! Restaurant search - query building and result mapping over an Elasticsearch index
//!
//! Translates a structured search request into a boolean query (relevance
//! clauses plus exact filters), runs it against the restaurant index and maps
//! the hits into typed records.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{build_query, build_search_body, Searcher};
pub use error::SearchError;
pub use models::{HygieneLevel, DietaryOptions, Restaurant, SearchRequest, SearchResponse};
pub use services::{ElasticsearchClient, SearchBackend};
