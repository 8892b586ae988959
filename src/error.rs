//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Internal detail (store failures, parse diagnostics) is logged but never
//! serialized into a response body verbatim.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "unauthorized: no matching webhook secret",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges below).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | Authentication  | 401 Unauthorized           |
/// | 3000–3999 | Server          | 500 Internal Server Error  |
/// | 4000–4999 | Payload         | 422 Unprocessable Entity   |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Signature verification failed or no configured webhook secret
    /// matched the delivery.
    #[error("unauthorized: no matching webhook secret")]
    Unauthorized,

    /// A payload of a known event type failed to parse against its schema.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A changeset has no external creation timestamp, so its history
    /// cannot be reconstructed. Fails the whole reconstruction batch.
    #[error("changeset {0} has no external creation time")]
    MissingCreationTime(i64),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Unauthorized => 2001,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::MissingCreationTime(_) => 3002,
            Self::MalformedPayload(_) => 4001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MalformedPayload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::MissingCreationTime(_) | Self::PersistenceError(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the message to expose to the HTTP client.
    ///
    /// Server-side failures are collapsed to a generic message; the full
    /// detail stays in the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::MissingCreationTime(_) | Self::PersistenceError(_) | Self::Internal(_) => {
                "internal error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.public_message(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_401() {
        assert_eq!(
            GatewayError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn malformed_maps_to_422() {
        let err = GatewayError::MalformedPayload("bad json".to_string());
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn server_errors_hide_detail() {
        let err = GatewayError::PersistenceError("connection refused to db-host:5432".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "internal error");
    }

    #[test]
    fn missing_creation_time_is_internal() {
        let err = GatewayError::MissingCreationTime(42);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn error_codes_fall_in_documented_ranges() {
        assert_eq!(GatewayError::Unauthorized.error_code(), 2001);
        assert_eq!(
            GatewayError::MalformedPayload(String::new()).error_code(),
            4001
        );
        assert_eq!(
            GatewayError::InvalidRequest(String::new()).error_code(),
            1001
        );
    }
}
