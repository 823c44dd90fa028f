use serde_json::{json, Map, Value};
use crate::core::filters::{
    cuisine_filter, dietary_filters, hygiene_filter, location_filter, min_range_filter,
};
use crate::models::SearchRequest;

/// Server-side search timeout used when none is configured
pub const DEFAULT_SEARCH_TIMEOUT: &str = "30s";

/// Exact match on the lowercase keyword sub-fields
pub const EXACT_FIELDS: [&str; 3] = ["name.keyword^4", "cuisines.keyword^3", "location.keyword^2"];

/// Analyzed (stemmed) text fields, matched with fuzziness
pub const ANALYZED_FIELDS: [&str; 3] = ["name^3", "cuisines^2", "location^1.5"];

/// Edge n-gram sub-fields for search-as-you-type
pub const PREFIX_FIELDS: [&str; 3] = ["name.edge_ngram^2", "cuisines.edge_ngram^1.5", "location.edge_ngram"];

/// Boolean query under construction
#[derive(Debug, Default, Clone)]
pub struct BoolQuery {
    pub must: Vec<Value>,
    pub filter: Vec<Value>,
}

impl BoolQuery {
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.filter.is_empty()
    }

    /// Render as query DSL; an empty bool query becomes `match_all`
    pub fn into_value(self) -> Value {
        if self.is_empty() {
            return json!({ "match_all": {} });
        }
        json!({ "bool": { "must": self.must, "filter": self.filter } })
    }
}

/// Relevance clause for free text
///
/// A disjunction of three tiers, strongest first: exact keyword match, fuzzy
/// analyzed match, then prefix match. At least one tier must match.
pub fn text_relevance_clause(text: &str) -> Value {
    json!({
        "bool": {
            "should": [
                {
                    "multi_match": {
                        "query": text,
                        "fields": EXACT_FIELDS,
                        "type": "cross_fields",
                        "operator": "and",
                    }
                },
                {
                    "multi_match": {
                        "query": text,
                        "fields": ANALYZED_FIELDS,
                        "type": "best_fields",
                        "fuzziness": "AUTO",
                        "operator": "and",
                    }
                },
                {
                    "multi_match": {
                        "query": text,
                        "fields": PREFIX_FIELDS,
                        "type": "phrase_prefix",
                        "operator": "and",
                    }
                }
            ],
            "minimum_should_match": 1,
        }
    })
}

/// Compose the query for a validated request
pub fn build_query(request: &SearchRequest) -> Value {
    let mut query = BoolQuery::default();

    if let Some(text) = request.query_text() {
        query.must.push(text_relevance_clause(text));
    }

    if let Some(cuisines) = request.cuisines() {
        query.filter.push(cuisine_filter(cuisines));
    }

    if let Some(min_rating) = request.min_rating {
        query.filter.push(min_range_filter("rating", min_rating));
    }

    if let Some(min_quality) = request.min_quality {
        query.filter.push(min_range_filter("quality", min_quality));
    }

    if let Some(min_hygiene) = request.min_hygiene_text() {
        query.filter.push(hygiene_filter(min_hygiene));
    }

    if let Some(preferences) = &request.dietary_preferences {
        query.filter.extend(dietary_filters(preferences));
    }

    if let Some(location) = request.location_text() {
        query.filter.push(location_filter(location));
    }

    query.into_value()
}

/// Sort order: best rated first, name as the stable tiebreak
pub fn sort_clause() -> Value {
    json!([
        { "rating": { "order": "desc" } },
        { "quality": { "order": "desc" } },
        { "name.keyword": { "order": "asc" } },
    ])
}

/// Full `_search` body: query, page window, sort and exact hit count
pub fn build_search_body(request: &SearchRequest, timeout: &str) -> Value {
    let mut body = Map::new();
    body.insert("query".to_string(), build_query(request));
    body.insert("from".to_string(), json!(request.offset()));
    body.insert("size".to_string(), json!(request.page_size));
    body.insert("sort".to_string(), sort_clause());
    body.insert("track_total_hits".to_string(), Value::Bool(true));
    body.insert("timeout".to_string(), Value::String(timeout.to_string()));
    Value::Object(body)
}
