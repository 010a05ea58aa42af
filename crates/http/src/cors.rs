//! CORS headers for the extension and dashboard origins.
//!
//! Every response carries the headers, including 4xx/5xx and the 404 fallback.
//! Disallowed origins get `*` rather than no header.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN,
    VARY,
};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use ecotoken_core::RelayConfig;
use ecotoken_core::constants::DEV_DASHBOARD_ORIGIN;

use crate::AppState;

const ALLOWED_METHODS: &str = "POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed: HashSet<String>,
    production: bool,
}

impl CorsPolicy {
    #[must_use]
    pub fn new(extension_id: Option<&str>, allow_origin: Option<&str>, production: bool) -> Self {
        let allowed = extension_id
            .map(|id| format!("chrome-extension://{id}"))
            .into_iter()
            .chain(allow_origin.map(ToOwned::to_owned))
            .chain(std::iter::once(DEV_DASHBOARD_ORIGIN.to_owned()))
            .collect();
        Self { allowed, production }
    }

    #[must_use]
    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(config.extension_id.as_deref(), config.allow_origin.as_deref(), config.production)
    }

    /// Echoes allow-listed origins (any origin outside production), else `*`.
    #[must_use]
    pub fn allow_origin<'a>(&self, origin: Option<&'a str>) -> &'a str {
        match origin {
            Some(origin) if !self.production || self.allowed.contains(origin) => origin,
            _ => "*",
        }
    }
}

pub(crate) async fn apply_cors(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request.headers().get(ORIGIN).cloned();
    let mut response = next.run(request).await;

    let allow_origin = origin
        .as_ref()
        .and_then(|value| value.to_str().ok())
        .map(|origin| state.cors.allow_origin(Some(origin)))
        .unwrap_or("*");
    let allow_origin =
        HeaderValue::from_str(allow_origin).unwrap_or_else(|_| HeaderValue::from_static("*"));

    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS));
    headers.insert(VARY, HeaderValue::from_static("Origin"));
    response
}
