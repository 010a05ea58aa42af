//! HTTP API server for the EcoToken relay.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]
#![allow(clippy::exhaustive_structs, reason = "HTTP types are stable")]

pub mod api_error;
pub mod cors;
mod handlers;
mod request_types;
#[cfg(test)]
mod router_tests;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::post;
use ecotoken_service::RelayService;
use tower_http::trace::TraceLayer;

pub use cors::CorsPolicy;

/// Shared application state for all HTTP handlers.
///
/// Read-only after startup; wrapped in `Arc` for sharing across handlers.
pub struct AppState {
    /// Sample, optimize and stats sequence for one request
    pub relay: Arc<RelayService>,
    /// Origin allow-list
    pub cors: CorsPolicy,
}

/// `OPTIONS`/`POST /api/optimize`; anything else is a plain-text 404.
///
/// Request bodies are unbounded: prompts of any size reach the handler.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/optimize",
            post(handlers::optimize::optimize)
                .options(handlers::optimize::preflight)
                .fallback(handlers::not_found),
        )
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::from_fn_with_state(Arc::clone(&state), cors::apply_cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
