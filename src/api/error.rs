//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::store::StoreError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed; `details` maps field names to messages
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: HashMap<String, String>,
    },

    /// Body-bearing request without a JSON content type
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// No route matched
    #[error("Not found: {0}")]
    NotFound(String),

    /// Store layer error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Validation failure on a single field
    pub fn invalid_field(
        message: impl Into<String>,
        field: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        let mut details = HashMap::new();
        details.insert(field.into(), detail.into());
        ApiError::Validation {
            message: message.into(),
            details,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(e) => {
                ApiError::UnsupportedMediaType(e.body_text())
            }
            other => ApiError::invalid_field("Invalid request body", "body", other.body_text()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::invalid_field("Invalid request parameters", "id", rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, String>>,
    pub timestamp: DateTime<Utc>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            ApiError::UnsupportedMediaType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_MEDIA_TYPE")
            }
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "ENTITY_NOT_FOUND"),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            ApiError::Internal(_) | ApiError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        // Server-side failures never leak internals to the client
        let (message, details) = match self {
            ApiError::Validation { message, details } => (message, Some(details)),
            ApiError::UnsupportedMediaType(msg) => (msg, None),
            ApiError::NotFound(msg) => (msg, None),
            ApiError::Store(_) => ("An internal error occurred".to_string(), None),
            ApiError::Internal(_) | ApiError::Io(_) => {
                ("An unexpected error occurred".to_string(), None)
            }
        };

        let body = ErrorResponse {
            error_code: code.to_string(),
            message,
            details,
            timestamp: Utc::now(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_envelope() {
        let error = ApiError::invalid_field("Invalid request parameters", "id", "Invalid node ID format");
        let (status, json) = body_json(error).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["errorCode"], "VALIDATION_FAILED");
        assert_eq!(json["details"]["id"], "Invalid node ID format");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_store_error_is_generic() {
        let error = ApiError::Store(StoreError::Lock("poisoned by panic".to_string()));
        let (status, json) = body_json(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["errorCode"], "DATABASE_ERROR");
        assert_eq!(json["message"], "An internal error occurred");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_is_generic() {
        let (status, json) = body_json(ApiError::Internal("boom".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["errorCode"], "INTERNAL_ERROR");
        assert_eq!(json["message"], "An unexpected error occurred");
    }
}
