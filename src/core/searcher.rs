use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::Instrument;
use validator::Validate;
use crate::core::query::{build_search_body, DEFAULT_SEARCH_TIMEOUT};
use crate::error::SearchError;
use crate::models::{Restaurant, SearchRequest, SearchResponse};
use crate::services::{BackendError, SearchBackend};

/// Total match count and the restaurants on the page
#[derive(Debug)]
pub struct SearchHits {
    pub total: u64,
    pub restaurants: Vec<Restaurant>,
}

/// Runs restaurant searches against an injected backend
///
/// # Pipeline
/// 1. Validate the request
/// 2. Compose the bool query, page window and sort
/// 3. Issue exactly one backend search
/// 4. Map raw hits into `Restaurant` records
#[derive(Clone)]
pub struct Searcher {
    backend: Arc<dyn SearchBackend>,
    index: String,
    search_timeout: String,
}

impl Searcher {
    pub fn new(backend: Arc<dyn SearchBackend>, index: impl Into<String>) -> Self {
        Self {
            backend,
            index: index.into(),
            search_timeout: DEFAULT_SEARCH_TIMEOUT.to_string(),
        }
    }

    /// Server-side timeout passed along with each search, e.g. `"10s"`
    pub fn with_search_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.search_timeout = timeout.into();
        self
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Search restaurants
    ///
    /// Validation failures return before anything is sent to the backend.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        request.validate()?;

        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("search", %request_id, page = request.page, page_size = request.page_size);

        async move {
            let body = build_search_body(request, &self.search_timeout);
            tracing::debug!("Search body: {}", body);

            let raw = self.backend.search(&self.index, &body).await.map_err(|e| match e {
                BackendError::Rejected { .. } => {
                    // Usually a page window past the index's max_result_window
                    let window = format!("from={}, size={}", request.offset(), request.page_size);
                    tracing::error!("Search rejected by backend ({}): {}", window, e);
                    SearchError::MalformedResponse(format!("{} ({})", e, window))
                }
                e => {
                    tracing::error!("Search backend call failed: {}", e);
                    SearchError::from(e)
                }
            })?;

            let hits = parse_hits(raw)?;

            tracing::info!(
                "Returning {} restaurants (total: {})",
                hits.restaurants.len(),
                hits.total
            );

            Ok(SearchResponse {
                total: hits.total,
                page: request.page,
                page_size: request.page_size,
                results: hits.restaurants,
            })
        }
        .instrument(span)
        .await
    }

    pub async fn health(&self) -> bool {
        self.backend.ping().await
    }
}

/// Map a raw `_search` response body into typed hits
///
/// Any hit that does not deserialize fails the whole call, so `total` never
/// disagrees with what was dropped.
pub fn parse_hits(response: Value) -> Result<SearchHits, SearchError> {
    if response.get("timed_out").and_then(Value::as_bool) == Some(true) {
        return Err(SearchError::BackendUnavailable(
            "Search timed out on the backend with partial results".to_string(),
        ));
    }

    let hits = response
        .get("hits")
        .ok_or_else(|| SearchError::MalformedResponse("Missing hits object".into()))?;

    let total = match hits.get("total") {
        Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64),
        Some(total) => total.as_u64(),
        None => None,
    }
    .ok_or_else(|| SearchError::MalformedResponse("Missing hits.total".into()))?;

    let raw_hits = hits
        .get("hits")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::MalformedResponse("Missing hits.hits array".into()))?;

    let restaurants = raw_hits
        .iter()
        .enumerate()
        .map(|(position, hit)| {
            let source = hit.get("_source").ok_or_else(|| {
                SearchError::MalformedIndexData(format!("Hit {} has no _source", position))
            })?;
            Restaurant::deserialize(source).map_err(|e| {
                let id = hit.get("_id").and_then(Value::as_str).unwrap_or("?");
                SearchError::MalformedIndexData(format!("Hit {} (id {}): {}", position, id, e))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SearchHits { total, restaurants })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedBackend {
        response: Value,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SearchBackend for CannedBackend {
        async fn search(&self, _index: &str, _body: &Value) -> Result<Value, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }

        async fn ping(&self) -> bool {
            true
        }
    }

    struct RejectingBackend;

    #[async_trait]
    impl SearchBackend for RejectingBackend {
        async fn search(&self, _index: &str, _body: &Value) -> Result<Value, BackendError> {
            Err(BackendError::Rejected {
                status: 400,
                body: "result window is too large, from + size must be less than or equal to: [10000] but was [10010]".to_string(),
            })
        }

        async fn ping(&self) -> bool {
            true
        }
    }

    fn canned(response: Value) -> Arc<CannedBackend> {
        Arc::new(CannedBackend {
            response,
            calls: AtomicUsize::new(0),
        })
    }

    fn hit(name: &str) -> Value {
        json!({
            "_id": name,
            "_source": {
                "name": name,
                "cuisines": ["thai"],
                "dietary_options": { "vegan": true },
                "hygiene": "good",
                "rating": 4.2
            }
        })
    }

    #[test]
    fn test_total_as_object_or_number() {
        let object = parse_hits(json!({ "hits": { "total": { "value": 15, "relation": "eq" }, "hits": [] } })).unwrap();
        assert_eq!(object.total, 15);

        let number = parse_hits(json!({ "hits": { "total": 7, "hits": [hit("Baan")] } })).unwrap();
        assert_eq!(number.total, 7);
        assert_eq!(number.restaurants[0].name, "Baan");
    }

    #[test]
    fn test_missing_total_is_malformed() {
        let result = parse_hits(json!({ "hits": { "hits": [] } }));
        assert!(matches!(result, Err(SearchError::MalformedResponse(_))));

        let result = parse_hits(json!({ "took": 3 }));
        assert!(matches!(result, Err(SearchError::MalformedResponse(_))));
    }

    #[test]
    fn test_bad_hit_fails_whole_page() {
        let cases = [
            ("missing hygiene", json!({ "_id": "x", "_source": { "name": "X", "cuisines": [], "dietary_options": {} } })),
            ("unknown hygiene", json!({ "_id": "x", "_source": { "name": "X", "cuisines": [], "dietary_options": {}, "hygiene": "spotless" } })),
            ("missing name", json!({ "_id": "x", "_source": { "cuisines": [], "dietary_options": {}, "hygiene": "good" } })),
            ("missing cuisines", json!({ "_id": "x", "_source": { "name": "X", "dietary_options": {}, "hygiene": "good" } })),
            ("missing dietary_options", json!({ "_id": "x", "_source": { "name": "X", "cuisines": [], "hygiene": "good" } })),
            ("missing _source", json!({ "_id": "x" })),
        ];

        for (label, bad) in cases {
            let response = json!({
                "hits": {
                    "total": { "value": 2 },
                    "hits": [hit("Baan"), bad]
                }
            });
            assert!(
                matches!(parse_hits(response), Err(SearchError::MalformedIndexData(_))),
                "{} should fail the page",
                label
            );
        }
    }

    #[test]
    fn test_rejected_search_reports_window() {
        let searcher = Searcher::new(Arc::new(RejectingBackend), "restaurants");
        let request = SearchRequest {
            page: 1001,
            page_size: 10,
            ..Default::default()
        };

        let result = tokio_test::block_on(searcher.search(&request));

        match result {
            Err(SearchError::MalformedResponse(msg)) => {
                assert!(msg.contains("result window is too large"));
                assert!(msg.contains("from=10000, size=10"));
            }
            other => panic!("expected MalformedResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_backend_timeout_flag() {
        let response = json!({ "timed_out": true, "hits": { "total": 1, "hits": [hit("Baan")] } });
        assert!(matches!(parse_hits(response), Err(SearchError::BackendUnavailable(_))));
    }

    #[test]
    fn test_invalid_request_never_reaches_backend() {
        let backend = canned(json!({ "hits": { "total": 0, "hits": [] } }));
        let searcher = Searcher::new(backend.clone(), "restaurants");
        let request = SearchRequest {
            page_size: 101,
            ..Default::default()
        };

        let result = tokio_test::block_on(searcher.search(&request));

        assert!(matches!(result, Err(SearchError::Validation(_))));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_search_echoes_paging() {
        let backend = canned(json!({ "hits": { "total": { "value": 1 }, "hits": [hit("Baan")] } }));
        let searcher = Searcher::new(backend.clone(), "restaurants");
        let request = SearchRequest {
            page: 3,
            ..Default::default()
        };

        let response = tokio_test::block_on(searcher.search(&request)).unwrap();

        assert_eq!(response.page, 3);
        assert_eq!(response.page_size, 10);
        assert_eq!(response.total, 1);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }
}
