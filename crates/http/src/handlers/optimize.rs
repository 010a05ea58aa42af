use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::Value;

use crate::AppState;
use crate::api_error::{ApiError, NO_RESULT};
use crate::request_types::parse_optimize_body;

/// Preflight; the CORS middleware adds the headers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn optimize(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request = parse_optimize_body(&body)?;
    let outcome = state.relay.handle(&request).await?;
    Ok(Json(outcome.unwrap_or_else(|| serde_json::json!({"error": NO_RESULT}))))
}
