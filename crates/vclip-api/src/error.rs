//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use vclip_models::{ErrorKind, ErrorRecord};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("rate limited")]
    RateLimited,

    #[error("internal error: {0}")]
    Internal(String),

    #[error("storage error: {0}")]
    Storage(#[from] vclip_storage::StorageError),

    #[error("registry error: {0}")]
    Queue(#[from] vclip_queue::QueueError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Queue(vclip_queue::QueueError::JobNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Queue(vclip_queue::QueueError::NotRetryable(_)) => StatusCode::CONFLICT,
            ApiError::Queue(vclip_queue::QueueError::CapacityExceeded) => {
                StatusCode::TOO_MANY_REQUESTS
            }
            ApiError::Internal(_) | ApiError::Storage(_) | ApiError::Queue(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthorized(_) => ErrorKind::Unauthorized,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::BadRequest(_) | ApiError::Conflict(_) => ErrorKind::BadRequest,
            ApiError::RateLimited => ErrorKind::BadRequest,
            ApiError::Queue(vclip_queue::QueueError::JobNotFound(_)) => ErrorKind::NotFound,
            ApiError::Queue(vclip_queue::QueueError::NotRetryable(_)) => ErrorKind::BadRequest,
            ApiError::Queue(vclip_queue::QueueError::CapacityExceeded) => ErrorKind::BadRequest,
            ApiError::Internal(_) | ApiError::Storage(_) | ApiError::Queue(_) => {
                ErrorKind::InternalError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR
            && std::env::var("ENVIRONMENT").unwrap_or_default() == "production"
        {
            "an internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorRecord::new(self.error_kind(), detail);
        (status, Json(ErrorBody { error: body })).into_response()
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorRecord,
}
