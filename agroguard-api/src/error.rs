//! API error type
//!
//! Maps service and store failures onto the `{success: false, error}`
//! response envelope. Production responses carry the probable cause
//! without leaking internals.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),

    /// Shared error type from the service layer
    #[error(transparent)]
    Common(#[from] agroguard_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use agroguard_common::Error as Common;

        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Common(common) => match common {
                Common::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
                Common::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
                Common::AuthorizationDenied(msg) => (StatusCode::FORBIDDEN, msg),
                other => {
                    // don't leak database/filesystem detail to clients
                    tracing::error!(error = %other, "internal error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
        };

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let response = ApiError::NotFound("Disease not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn common_invalid_input_maps_to_400() {
        let err: ApiError = agroguard_common::Error::InvalidInput("name required".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn infrastructure_errors_are_opaque_500s() {
        let err: ApiError = agroguard_common::Error::Http("db details".into()).into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
