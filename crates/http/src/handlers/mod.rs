#![allow(clippy::single_call_fn, reason = "HTTP handlers are called once from router")]

pub mod optimize;

use axum::http::StatusCode;

/// Fallback for every unsupported path or method.
pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}
