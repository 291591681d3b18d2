// SPDX-License-Identifier: MIT

//! HTTP route handlers.

pub mod api;
pub mod auth;
pub mod pages;

use crate::middleware::auth::{require_admin, require_staff, require_worker};
use crate::AppState;
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Public routes (no role gate; the root handler applies its own policy)
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/", get(pages::root))
        .merge(auth::routes())
        .merge(api::routes());

    // Role-gated pages
    let admin_pages = Router::new()
        .route("/dashboard", get(pages::dashboard))
        .route("/reports", get(pages::reports))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let worker_pages = Router::new()
        .route("/alerts", get(pages::alerts))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_worker));

    let staff_pages = Router::new()
        .route("/map", get(pages::map))
        .route("/alert", get(pages::alert))
        .route("/routes", get(pages::collection_routes))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_staff));

    Router::new()
        .merge(public_routes)
        .merge(admin_pages)
        .merge(worker_pages)
        .merge(staff_pages)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
