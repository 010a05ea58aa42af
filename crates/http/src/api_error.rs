//! Typed API error for HTTP handlers.
//!
//! Converts request and service failures into the relay's JSON error bodies:
//! `{"error": "MISSING_TAG"}` and `{"error": "BACKEND_EXCEPTION", "detail": "..."}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ecotoken_service::ServiceError;

pub const MISSING_TAG: &str = "MISSING_TAG";
pub const BACKEND_EXCEPTION: &str = "BACKEND_EXCEPTION";
pub const NO_RESULT: &str = "NO_RESULT";

#[derive(Debug)]
pub enum ApiError {
    /// 400: the request has no usable `tag`.
    MissingTag,
    /// 500: the body could not be parsed or the optimize call failed. The detail is exposed.
    BackendException(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingTag => {
                (StatusCode::BAD_REQUEST, Json(serde_json::json!({"error": MISSING_TAG})))
                    .into_response()
            },
            Self::BackendException(detail) => {
                tracing::error!(detail = %detail, "handler error");
                let body = serde_json::json!({"error": BACKEND_EXCEPTION, "detail": detail});
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            },
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self::BackendException(err.to_string())
    }
}
