//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::cases::{get_case, get_result, list_cases, upload_image};
use crate::handlers::enhance::enhance_face;
use crate::handlers::health::{health, ready};
use crate::handlers::models::list_models;
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/models", get(list_models))
        .route("/upload-image", post(upload_image))
        .route("/enhance-face/:case_id", post(enhance_face))
        .route("/case/:case_id", get(get_case))
        .route("/result/:result_id", get(get_result))
        .route("/cases", get(list_cases));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .route("/ready", get(ready))
        .merge(metrics_routes)
        // The multipart extractor enforces its own limit; raise both to
        // the configured size so uploads aren't capped at axum's default.
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
