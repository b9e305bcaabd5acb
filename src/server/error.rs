use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::generation::GenerationError;

/// Shared error body: `{"error": "..."}`, plus `raw` for unusable model output.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            raw: None,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Generation(GenerationError),
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        ApiError::Generation(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, ErrorResponse::new("Not found")),
            ApiError::Generation(err) => match err {
                GenerationError::RateLimited => {
                    (StatusCode::TOO_MANY_REQUESTS, ErrorResponse::new(err.to_string()))
                }
                GenerationError::MissingText => {
                    (StatusCode::BAD_REQUEST, ErrorResponse::new(err.to_string()))
                }
                GenerationError::InvalidRecipe { raw, .. } => (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse {
                        error: "Invalid recipe".to_string(),
                        raw: Some(raw),
                    },
                ),
                GenerationError::Upstream(_) | GenerationError::Store(_) => {
                    tracing::error!(error = %err, "AI error");
                    (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new(err.to_string()))
                }
            },
        };
        (status, Json(body)).into_response()
    }
}
