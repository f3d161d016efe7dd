//! HTTP error mapping.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

/// Errors returned by HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Store or integration failure
    Internal(lds_core::Error),
    /// Unknown file id; rendered without a body
    NotFound,
    BadRequest(String),
    PayloadTooLarge(String),
}

impl From<lds_core::Error> for ApiError {
    fn from(err: lds_core::Error) -> Self {
        match err {
            lds_core::Error::NotFound(_) | lds_core::Error::FileNotFound(_) => ApiError::NotFound,
            lds_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(format!("Multipart error: {}", err.body_text()))
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound => return StatusCode::NOT_FOUND.into_response(),
            ApiError::Internal(err) => {
                error!(subsystem = "api", error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_not_found_variants_map_to_404() {
        let err: ApiError = lds_core::Error::FileNotFound(Uuid::nil()).into();
        assert!(matches!(err, ApiError::NotFound));
        let err: ApiError = lds_core::Error::NotFound("x".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_input_maps_to_400() {
        let err: ApiError = lds_core::Error::InvalidInput("bad key".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_store_failures_map_to_500() {
        let err: ApiError = lds_core::Error::Storage("disk full".into()).into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_payload_too_large_maps_to_413() {
        let response = ApiError::PayloadTooLarge("too big".into()).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
