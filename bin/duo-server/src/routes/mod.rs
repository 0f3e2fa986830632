//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - The rendered info page at `/`
//! - Health / heartbeat route
//! - JSON API under `/api` and its OpenAPI document

pub mod doc;
mod health;
mod page;
mod messages;

use axum::http::Uri;
use axum::routing::get;
use axum::{Json, Router, middleware};
use std::sync::Arc;
use tower::ServiceBuilder;

use crate::error::ServerError;
use crate::middleware::{cors, trace};
use crate::state::AppState;

// ── Router builder ────────────────────────────────────────────────────────────

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .merge(page::api_router())
        .merge(messages::router());

    Router::new()
        .merge(page::page_router())
        .merge(health::router())
        .nest("/api", api_router)
        .route("/api-docs/openapi.json", get(|| async { Json(doc::get_docs()) }))
        .fallback(not_found)
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(&state.config)))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

async fn not_found(uri: Uri) -> ServerError {
    ServerError::NotFound(format!("no route for {}", uri.path()))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
