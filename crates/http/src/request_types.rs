//! Request body parsing for `POST /api/optimize`.
//!
//! Parsed by hand rather than through `Json<T>` so a missing tag is a 400
//! `MISSING_TAG` and a malformed body is a 500 `BACKEND_EXCEPTION`.

use ecotoken_core::OptimizeRequest;
use serde_json::{Map, Value};

use crate::api_error::ApiError;

pub(crate) fn parse_optimize_body(body: &[u8]) -> Result<OptimizeRequest, ApiError> {
    if body.is_empty() {
        return Err(ApiError::MissingTag);
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::BackendException(format!("invalid JSON body: {e}")))?;
    let fields = match value {
        Value::Object(fields) => fields,
        Value::Null => {
            return Err(ApiError::BackendException("request body must not be null".to_owned()));
        },
        _ => return Err(ApiError::MissingTag),
    };

    // Only a non-empty string is a tag; numbers and booleans are rejected
    // rather than bound as text.
    let tag = fields
        .get("tag")
        .and_then(Value::as_str)
        .filter(|tag| !tag.is_empty())
        .ok_or(ApiError::MissingTag)?;

    Ok(OptimizeRequest {
        tag: tag.to_owned(),
        raw_filter: text_field(&fields, "raw_filter"),
        model: text_field(&fields, "model"),
        raw_text: text_field(&fields, "raw_text"),
    })
}

/// `null` and absent are `None`; non-string scalars are bound in their JSON form.
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
