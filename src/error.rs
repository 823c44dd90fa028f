use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use crate::models::ErrorResponse;
use crate::services::BackendError;

/// Errors surfaced by a search call
///
/// Each variant has its own HTTP status and error code so callers can tell
/// "no matches" apart from a degraded search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid search request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Search backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Malformed search response: {0}")]
    MalformedResponse(String),

    #[error("Malformed index data: {0}")]
    MalformedIndexData(String),
}

impl SearchError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            SearchError::Validation(_) => "validation_error",
            SearchError::BackendUnavailable(_) => "search_backend_unavailable",
            SearchError::MalformedResponse(_) => "malformed_response",
            SearchError::MalformedIndexData(_) => "malformed_index_data",
        }
    }
}

impl From<BackendError> for SearchError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unavailable(msg) => SearchError::BackendUnavailable(msg),
            rejected @ BackendError::Rejected { .. } => SearchError::MalformedResponse(rejected.to_string()),
            BackendError::InvalidBody(msg) => SearchError::MalformedResponse(msg),
        }
    }
}

impl ResponseError for SearchError {
    fn status_code(&self) -> StatusCode {
        match self {
            SearchError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SearchError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            SearchError::MalformedResponse(_) | SearchError::MalformedIndexData(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}
