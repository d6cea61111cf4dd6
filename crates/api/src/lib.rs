//! HTTP API server with observability for the renovation ERP workflow core.
//!
//! Exposes the workflow operations as REST endpoints, with structured
//! logging (tracing) and Prometheus metrics. Every business response uses
//! the `{success, data, message}` envelope.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use workflow::WorkflowService;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub workflows: WorkflowService<S>,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/customers", post(routes::customers::create::<S>))
        .route("/orders", post(routes::orders::create::<S>))
        .route(
            "/order-materials/{id}",
            patch(routes::orders::update_material::<S>),
        )
        .route("/orders/{id}/sign", post(routes::orders::sign::<S>))
        .route("/orders/{id}/start", post(routes::orders::start::<S>))
        .route("/orders/{id}/complete", post(routes::orders::complete::<S>))
        .route("/payments/{id}/confirm", post(routes::payments::confirm::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state over the given store.
pub fn create_default_state<S: Store + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        workflows: WorkflowService::new(store),
    })
}
