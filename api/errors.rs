use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::service::ServiceError;

// The wire shape of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: String,
    pub reason: String,
}

/// Builds the error envelope response for `status`, with a machine code
/// derived from the status class.
pub(crate) fn envelope_response(
    status: StatusCode,
    reason: String,
) -> Response {
    let body = ErrorEnvelope {
        code: format!("ROSTER-{}", status.as_u16()),
        reason,
    };
    (status, Json(body)).into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body could not be decoded at all.
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
    /// The query string could not be decoded.
    #[error("Malformed query string: {0}")]
    MalformedQuery(String),
    #[error(transparent)]
    ValidationError(#[from] validator::ValidationErrors),
    #[error(transparent)]
    ServiceError(#[from] ServiceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reason) = match self {
            | ApiError::MalformedBody(_) | ApiError::MalformedQuery(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            | ApiError::ValidationError(_) => {
                let reason = format!("Input validation error: [{}]", self)
                    .replace('\n', ", ");
                (StatusCode::BAD_REQUEST, reason)
            }
            | ApiError::ServiceError(ServiceError::NotFound(reason)) => {
                (StatusCode::NOT_FOUND, reason)
            }
            | ApiError::ServiceError(ServiceError::Conflict(reason)) => {
                (StatusCode::CONFLICT, reason)
            }
            | ApiError::ServiceError(ServiceError::InvalidRequest(reason)) => {
                (StatusCode::BAD_REQUEST, reason)
            }
            | ApiError::ServiceError(ServiceError::Internal(e)) => {
                // The chain is for the operator; the caller gets a generic
                // envelope that leaks nothing.
                error!("Request handler failed: {e:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
        };
        envelope_response(status, reason)
    }
}
