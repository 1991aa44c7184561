//! Universal error handling for the API

use axum::{
    extract::rejection::{BytesRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use object_storage::OperationError;
use serde::Serialize;

/// API error response body
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    /// Human-readable error message
    pub error: String,
}

/// Message attached to error responses so the access log can report it
#[derive(Debug, Clone)]
pub struct ErrorAnnotation(pub String);

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                error: message.into(),
            },
        }
    }

    /// Missing or unparseable input, reported before any storage call
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Missing or invalid authorization token
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Any storage or unexpected failure
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Translates a storage failure into a response
    ///
    /// `failure` describes the attempted operation, e.g.
    /// `"Failed to copy object a/x to b/y"`. Not-found errors append the
    /// missing bucket or key; other causes are only logged.
    #[must_use]
    pub fn from_operation(failure: &str, err: &OperationError) -> Self {
        let status = status_for(err);

        if err.is_not_found() {
            Self::new(status, format!("{failure}: {err}"))
        } else {
            tracing::error!("{failure}: {err}");
            Self::new(status, failure)
        }
    }

    /// HTTP status of the error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Message returned to the caller
    #[must_use]
    pub fn message(&self) -> &str {
        &self.inner.error
    }
}

/// Status code for a storage failure
#[must_use]
pub const fn status_for(err: &OperationError) -> StatusCode {
    match err {
        OperationError::BucketNotFound { .. } | OperationError::KeyNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        OperationError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert path extraction failures to application errors
impl From<PathRejection> for AppError {
    fn from(err: PathRejection) -> Self {
        tracing::debug!("Path rejection: {err:?}");
        Self::new(err.status(), err.body_text())
    }
}

/// Convert query string failures to application errors
impl From<QueryRejection> for AppError {
    fn from(err: QueryRejection) -> Self {
        Self::bad_request(err.body_text())
    }
}

/// Convert body read failures to application errors
impl From<BytesRejection> for AppError {
    fn from(err: BytesRejection) -> Self {
        Self::new(err.status(), format!("Failed to parse body: {}", err.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!("Client error: {} - {}", self.status, self.inner.error),
            500..=599 => tracing::error!("Server error: {} - {}", self.status, self.inner.error),
            _ => {}
        }

        let annotation = ErrorAnnotation(self.inner.error.clone());
        let mut response = (self.status, Json(self.inner)).into_response();
        response.extensions_mut().insert(annotation);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_operation_errors() {
        let bucket = OperationError::BucketNotFound {
            bucket: "b".to_string(),
        };
        let key = OperationError::KeyNotFound {
            bucket: "b".to_string(),
            key: "/k".to_string(),
        };
        let unknown = OperationError::Unknown("connection reset".to_string());

        assert_eq!(status_for(&bucket), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&key), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&unknown), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_message_names_target() {
        let err = AppError::from_operation(
            "Failed to copy object b/k to c/k",
            &OperationError::KeyNotFound {
                bucket: "b".to_string(),
                key: "/k".to_string(),
            },
        );

        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            err.message(),
            "Failed to copy object b/k to c/k: key not found: b/k"
        );
    }

    #[test]
    fn test_unknown_cause_is_not_returned() {
        let err = AppError::from_operation(
            "Failed to create PutObject URL for b/k",
            &OperationError::Unknown("dispatch failure: io error: secret-host:443".to_string()),
        );

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Failed to create PutObject URL for b/k");
    }

    #[test]
    fn test_query_rejection_keeps_reason() {
        let rejection = axum::extract::Query::<std::collections::HashMap<String, u8>>::try_from_uri(
            &"/?n=nope".parse().unwrap(),
        )
        .unwrap_err();

        let err = AppError::from(rejection);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message().starts_with("Failed to deserialize query string"));
    }

    #[test]
    fn test_response_carries_annotation() {
        let response = AppError::bad_request("Missing destination bucket").into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let annotation = response.extensions().get::<ErrorAnnotation>().unwrap();
        assert_eq!(annotation.0, "Missing destination bucket");
    }
}
