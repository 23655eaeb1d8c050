//! HTTP API route definitions.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::endpoints::{cliente, endereco};
use super::handlers::{consult_cep, health, home, openapi, render_metrics, AppState};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/openapi", get(openapi))
        // Health and metrics
        .route("/health", get(health))
        .route("/metrics", get(render_metrics))
        // Records
        .merge(cliente::router())
        .merge(endereco::router())
        // Raw provider passthrough
        .route("/consulta-cep", get(consult_cep))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
