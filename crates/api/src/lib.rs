//! HTTP API server for the commerce backend.
//!
//! Provides REST endpoints for users, products, and purchases, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain::{CatalogService, PurchaseService, PurchaseViews};
use store::CommerceStore;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: CommerceStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        .route("/users", get(routes::users::list::<S>))
        .route("/users", post(routes::users::create::<S>))
        .route("/users/{id}", get(routes::users::get::<S>))
        .route("/users/{id}", put(routes::users::update::<S>))
        .route("/users/{id}", delete(routes::users::remove::<S>))
        .route(
            "/users/{id}/purchases",
            get(routes::purchases::list_for_user::<S>),
        )
        .route("/products", get(routes::products::list::<S>))
        .route("/products", post(routes::products::create::<S>))
        .route("/products/search", get(routes::products::search::<S>))
        .route("/products/{id}", get(routes::products::get::<S>))
        .route("/products/{id}", put(routes::products::update::<S>))
        .route("/products/{id}", delete(routes::products::remove::<S>))
        .route("/purchases", get(routes::purchases::list::<S>))
        .route("/purchases", post(routes::purchases::create::<S>))
        .route("/purchases/{id}", get(routes::purchases::get::<S>))
        .route("/purchases/{id}", delete(routes::purchases::remove::<S>))
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

/// Creates the application state with the three services over one store.
pub fn create_default_state<S: CommerceStore + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        backend: store.backend(),
        catalog: CatalogService::new(store.clone()),
        purchases: PurchaseService::new(store.clone()),
        views: PurchaseViews::new(store),
    })
}
