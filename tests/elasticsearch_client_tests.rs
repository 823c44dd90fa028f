// Wire-level tests for the Elasticsearch client

use mockito::{Matcher, Server};
use restaurant_search::core::Searcher;
use restaurant_search::error::SearchError;
use restaurant_search::models::SearchRequest;
use restaurant_search::services::{BackendError, ElasticsearchClient, ElasticsearchOptions, SearchBackend};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn client_for(url: &str, api_key: Option<&str>) -> ElasticsearchClient {
    let mut options = ElasticsearchOptions::new(url);
    options.api_key = api_key.map(str::to_string);
    options.request_timeout = Duration::from_secs(2);
    options.max_retries = 1;
    options.retry_backoff = Duration::from_millis(10);
    ElasticsearchClient::new(options).unwrap()
}

#[tokio::test]
async fn test_search_posts_body_with_api_key() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/restaurants/_search")
        .match_header("authorization", "ApiKey c2VjcmV0")
        .match_body(Matcher::PartialJson(json!({
            "from": 5,
            "size": 5,
            "track_total_hits": true,
            "query": { "bool": { "filter": [{ "range": { "rating": { "gte": 4.0 } } }] } }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "took": 2,
                "timed_out": false,
                "hits": {
                    "total": { "value": 6, "relation": "eq" },
                    "hits": [{
                        "_id": "a1",
                        "_source": {
                            "name": "Spice Route",
                            "cuisines": ["indian"],
                            "dietary_options": { "vegetarian": true },
                            "hygiene": "good",
                            "rating": 4.5
                        }
                    }]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server.url(), Some("c2VjcmV0"));
    let searcher = Searcher::new(Arc::new(client), "restaurants");
    let request = SearchRequest {
        min_rating: Some(4.0),
        page: 2,
        page_size: 5,
        ..Default::default()
    };

    let response = searcher.search(&request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.total, 6);
    assert_eq!(response.page, 2);
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].name, "Spice Route");
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/restaurants/_search")
        .with_status(503)
        .with_body("cluster_block_exception")
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server.url(), None);
    let result = client.search("restaurants", &json!({ "query": { "match_all": {} } })).await;

    // HTTP errors are not retried
    mock.assert_async().await;
    assert!(matches!(result, Err(BackendError::Unavailable(_))));
}

#[tokio::test]
async fn test_bad_request_is_rejected() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/restaurants/_search")
        .with_status(400)
        .with_body(r#"{"error":{"type":"parsing_exception"}}"#)
        .create_async()
        .await;

    let client = client_for(&server.url(), None);
    let result = client.search("restaurants", &json!({})).await;

    match result {
        Err(BackendError::Rejected { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("parsing_exception"));
        }
        other => panic!("expected Rejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_body_is_malformed_response() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/restaurants/_search")
        .with_status(200)
        .with_body("<html>proxy login</html>")
        .create_async()
        .await;

    let searcher = Searcher::new(Arc::new(client_for(&server.url(), None)), "restaurants");
    let result = searcher.search(&SearchRequest::default()).await;

    assert!(matches!(result, Err(SearchError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_missing_hits_is_malformed_response() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/restaurants/_search")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"took": 1, "timed_out": false}"#)
        .create_async()
        .await;

    let searcher = Searcher::new(Arc::new(client_for(&server.url(), None)), "restaurants");
    let result = searcher.search(&SearchRequest::default()).await;

    assert!(matches!(result, Err(SearchError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_unreachable_backend_is_unavailable() {
    // Nothing listens on port 1
    let client = client_for("http://127.0.0.1:1", None);

    let result = client.search("restaurants", &json!({})).await;

    assert!(matches!(result, Err(BackendError::Unavailable(_))));
    assert!(!client.ping().await);
}

#[tokio::test]
async fn test_ping() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/")
        .with_status(200)
        .with_body(r#"{"cluster_name":"restaurants"}"#)
        .create_async()
        .await;

    let client = client_for(&server.url(), None);

    assert!(client.ping().await);
}

#[tokio::test]
async fn test_stalled_backend_times_out_as_unavailable() {
    // Accepts connections and never writes a response
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let mut options = ElasticsearchOptions::new(format!("http://{}", addr));
    options.request_timeout = Duration::from_millis(500);
    options.max_retries = 3;
    let searcher = Searcher::new(Arc::new(ElasticsearchClient::new(options).unwrap()), "restaurants");

    let started = std::time::Instant::now();
    let result = searcher.search(&SearchRequest::default()).await;

    assert!(matches!(result, Err(SearchError::BackendUnavailable(_))));
    // Timeouts are not retried
    assert!(started.elapsed() < Duration::from_secs(3));
}
