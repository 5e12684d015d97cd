//! API error types with `{ "error": "..." }` JSON bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::simulation::{
    classify_failure, FailureKind, SimulationError, QUOTA_EXCEEDED_MESSAGE,
};

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{}", QUOTA_EXCEEDED_MESSAGE)]
    QuotaExceeded,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(detail) => tracing::error!(detail, "API internal error"),
            ApiError::QuotaExceeded => tracing::warn!("AI provider quota exhausted"),
            _ => {}
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Quota failures become 429; missing input 400; everything else is a
/// 500 carrying the raw message.
impl From<SimulationError> for ApiError {
    fn from(err: SimulationError) -> Self {
        match classify_failure(&err) {
            FailureKind::QuotaExceeded => ApiError::QuotaExceeded,
            FailureKind::InvalidInput => ApiError::BadRequest(err.to_string()),
            FailureKind::Other => ApiError::Internal(err.to_string()),
        }
    }
}
