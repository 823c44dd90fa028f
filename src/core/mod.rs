// Core search exports
pub mod filters;
pub mod query;
pub mod searcher;

pub use filters::{acceptable_hygiene_levels, FALLBACK_HYGIENE};
pub use query::{build_query, build_search_body, text_relevance_clause, BoolQuery};
pub use searcher::{parse_hits, SearchHits, Searcher};
