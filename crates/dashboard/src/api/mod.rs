//! HTTP API for the dashboard.
//!
//! ## Modules
//!
//! - `handlers` - Request handlers over a shared [`Dashboard`]
//! - `routes` - Axum router for the API endpoints
//! - `models` - Query parameters and error bodies

pub mod handlers;
pub mod models;
pub mod routes;

use axum::Router;
use config::ApiConfig;
use server::health_routes;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::orchestrator::Dashboard;
pub use handlers::ApiState;
pub use routes::api_routes;

/// Full application router: API endpoints under `api.prefix`, health at the root.
pub fn dashboard_router(dashboard: Arc<Dashboard>, api: &ApiConfig) -> Router {
    let health = health_routes(dashboard.health());
    let endpoints = api_routes(Arc::new(ApiState::new(dashboard)));

    let prefix = api.prefix.trim_end_matches('/');
    let router = if prefix.is_empty() {
        Router::new().merge(endpoints)
    } else {
        Router::new().nest(prefix, endpoints)
    }
    .merge(health)
    .layer(TraceLayer::new_for_http());

    if api.cors_allow_any {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}
