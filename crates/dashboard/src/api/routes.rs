//! Axum route definitions for the dashboard API.

use axum::routing::get;
use axum::Router;
use std::sync::Arc;

use crate::api::handlers::{self, ApiState};

/// Create all dashboard routes, relative to the API prefix.
///
/// # Routes
///
/// - `GET /optionchain` - Normalized chain rows
/// - `GET /window_stats` - Window analytics, records a snapshot
/// - `GET /candles` - Candles folded from the snapshot log
/// - `GET /index_ohlc` - Index OHLC with momentum
/// - `GET /market_stats` - Advance/decline counts
/// - `GET /greeks` - Black-Scholes Greeks per row
pub fn api_routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/optionchain", get(handlers::option_chain))
        .route("/window_stats", get(handlers::window_stats))
        .route("/candles", get(handlers::candles))
        .route("/index_ohlc", get(handlers::index_ohlc))
        .route("/market_stats", get(handlers::market_stats))
        .route("/greeks", get(handlers::greeks))
        .with_state(state)
}
