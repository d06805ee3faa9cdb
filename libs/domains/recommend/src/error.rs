use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Factor payload is empty")]
    EmptyPayload,

    #[error("Malformed factor payload: {0}")]
    MalformedPayload(String),

    #[error("Factor dimension mismatch: query has {query}, candidate has {candidate}")]
    DimensionMismatch { query: usize, candidate: usize },

    #[error("Document {0} carries no model factor vector")]
    NoVector(String),

    #[error("Document not found in {collection}: {id}")]
    NotFound { collection: String, id: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type RecommendResult<T> = Result<T, RecommendError>;

impl From<reqwest::Error> for RecommendError {
    fn from(err: reqwest::Error) -> Self {
        RecommendError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for RecommendError {
    fn from(err: serde_json::Error) -> Self {
        RecommendError::Internal(format!("JSON error: {}", err))
    }
}

/// Convert RecommendError to AppError for standardized HTTP error responses
impl From<RecommendError> for AppError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::NotFound { collection, id } => {
                AppError::NotFound(format!("Document {} not found in {}", id, collection))
            }
            RecommendError::NoVector(id) => AppError::UnprocessableEntity(format!(
                "Document {} carries no model factor vector",
                id
            )),
            RecommendError::EmptyPayload => {
                AppError::UnprocessableEntity("Factor payload is empty".to_string())
            }
            RecommendError::MalformedPayload(msg) => {
                AppError::UnprocessableEntity(format!("Malformed factor payload: {}", msg))
            }
            RecommendError::DimensionMismatch { query, candidate } => {
                AppError::UnprocessableEntity(format!(
                    "Factor dimension mismatch: query has {}, candidate has {}",
                    query, candidate
                ))
            }
            RecommendError::Store(msg) => {
                AppError::ServiceUnavailable(format!("Store error: {}", msg))
            }
            RecommendError::Config(msg) => {
                AppError::InternalServerError(format!("Config error: {}", msg))
            }
            RecommendError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for RecommendError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
