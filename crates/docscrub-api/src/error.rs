//! Maps domain errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use docscrub_core::error::{AppError, ErrorKind};
use docscrub_worker::JobError;

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Handler error: an [`AppError`] rendered as JSON.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// HTTP status and error code for an error kind.
    pub fn status_for(kind: ErrorKind) -> (StatusCode, &'static str) {
        match kind {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ErrorKind::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
            ErrorKind::Timeout => (StatusCode::REQUEST_TIMEOUT, "PROCESSING_TIMEOUT"),
            ErrorKind::Transformation => (StatusCode::INTERNAL_SERVER_ERROR, "PROCESSING_FAILED"),
            ErrorKind::Storage
            | ErrorKind::Configuration
            | ErrorKind::Serialization
            | ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = Self::status_for(self.0.kind);

        if status.is_server_error() {
            tracing::error!(kind = %self.0.kind, error = %self.0.message, "Request failed");
        }

        // Storage and internal messages can carry paths; keep them in the logs.
        let message = match self.0.kind {
            ErrorKind::Storage
            | ErrorKind::Configuration
            | ErrorKind::Serialization
            | ErrorKind::Internal => "Internal server error".to_string(),
            _ => self.0.message,
        };

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docscrub_core::types::JobId;

    #[test]
    fn test_lifecycle_errors_map_to_distinct_statuses() {
        let id = JobId::new();
        let cases = [
            (JobError::NotFound { job_id: id }, StatusCode::NOT_FOUND),
            (JobError::InFlight { job_id: id }, StatusCode::CONFLICT),
            (
                JobError::Timeout {
                    job_id: id,
                    timeout_seconds: 240,
                },
                StatusCode::REQUEST_TIMEOUT,
            ),
            (
                JobError::Transformation {
                    job_id: id,
                    reason: "boom".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_upload_errors() {
        assert_eq!(
            ApiError::from(AppError::payload_too_large("big"))
                .into_response()
                .status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::from(AppError::validation("bad"))
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }
}
