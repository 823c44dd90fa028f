// Service exports
pub mod elasticsearch;

pub use elasticsearch::{BackendError, ElasticsearchClient, ElasticsearchOptions, SearchBackend};
