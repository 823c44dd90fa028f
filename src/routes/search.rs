use actix_web::{web, HttpResponse, Responder};
use crate::core::Searcher;
use crate::error::SearchError;
use crate::models::{HealthResponse, SearchRequest};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub searcher: Searcher,
}

/// Configure search-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/search", web::post().to(search));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.searcher.health().await { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Restaurant search endpoint
///
/// POST /api/v1/search
///
/// Request body:
/// ```json
/// {
///   "query": "spice",
///   "cuisine_types": ["indian"],
///   "min_rating": 4.0,
///   "min_quality": 7.0,
///   "min_hygiene": "good",
///   "dietary_preferences": { "vegan": true },
///   "location": "brick lane",
///   "page": 1,
///   "page_size": 10
/// }
/// ```
pub async fn search(
    state: web::Data<AppState>,
    req: web::Json<SearchRequest>,
) -> Result<HttpResponse, SearchError> {
    tracing::info!(
        "Search: query={:?}, location={:?}, page={}, page_size={}",
        req.query,
        req.location,
        req.page,
        req.page_size
    );

    let response = state.searcher.search(&req).await.map_err(|e| {
        if let SearchError::Validation(errors) = &e {
            tracing::info!("Validation failed for search request: {}", errors);
        }
        e
    })?;

    Ok(HttpResponse::Ok().json(response))
}
