//! HTTP request handlers for the dashboard API.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use market_data::{Candle, CandleInterval, ContractTable};
use observability::{RequestMetricsGuard, ServerMetrics};
use std::sync::Arc;

use crate::api::models::*;
use crate::error::DashboardError;
use crate::orchestrator::Dashboard;
use crate::quotes::{IndexQuote, MarketBreadth};
use crate::report::{GreeksReport, WindowStats};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Shared state for dashboard handlers.
pub struct ApiState {
    pub dashboard: Arc<Dashboard>,
    option_chain: ServerMetrics,
    window_stats: ServerMetrics,
    candles: ServerMetrics,
    index_ohlc: ServerMetrics,
    market_stats: ServerMetrics,
    greeks: ServerMetrics,
}

impl ApiState {
    pub fn new(dashboard: Arc<Dashboard>) -> Self {
        Self {
            dashboard,
            option_chain: ServerMetrics::new("optionchain"),
            window_stats: ServerMetrics::new("window_stats"),
            candles: ServerMetrics::new("candles"),
            index_ohlc: ServerMetrics::new("index_ohlc"),
            market_stats: ServerMetrics::new("market_stats"),
            greeks: ServerMetrics::new("greeks"),
        }
    }
}

fn status_for(e: &DashboardError) -> StatusCode {
    match e {
        DashboardError::Upstream(_) => StatusCode::BAD_GATEWAY,
        DashboardError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
        DashboardError::Storage(_) | DashboardError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(guard: &mut RequestMetricsGuard<'_>, e: DashboardError) -> ApiError {
    let status = status_for(&e);
    guard.set_status(status.as_u16());
    tracing::warn!(code = e.code(), status = status.as_u16(), error = %e, "Request failed");
    (status, Json(ErrorResponse::from(&e)))
}

/// GET /optionchain
pub async fn option_chain(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ContractTable>, ApiError> {
    let mut guard = RequestMetricsGuard::new(&state.option_chain);
    state
        .dashboard
        .option_chain()
        .await
        .map(Json)
        .map_err(|e| reject(&mut guard, e))
}

/// GET /window_stats?mode=FIXED|COUNT&atm_window=k
pub async fn window_stats(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<WindowStatsParams>,
) -> Json<WindowStats> {
    let _guard = RequestMetricsGuard::new(&state.window_stats);
    Json(state.dashboard.window_stats(params.into()).await)
}

/// GET /candles?interval=1m
pub async fn candles(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<CandleParams>,
) -> Result<Json<Vec<Candle>>, ApiError> {
    let mut guard = RequestMetricsGuard::new(&state.candles);

    let interval = match params.interval.as_deref() {
        None => CandleInterval::default(),
        Some(raw) => raw
            .parse::<CandleInterval>()
            .map_err(|e| reject(&mut guard, DashboardError::InvalidRequest(e.to_string())))?,
    };

    state
        .dashboard
        .candles(interval)
        .await
        .map(Json)
        .map_err(|e| reject(&mut guard, e))
}

/// GET /index_ohlc
pub async fn index_ohlc(State(state): State<Arc<ApiState>>) -> Json<Lookup<IndexQuote>> {
    let _guard = RequestMetricsGuard::new(&state.index_ohlc);
    Json(match state.dashboard.index_ohlc().await {
        Ok(quote) => Lookup::Found(quote),
        Err(e) => Lookup::Failed(ErrorResponse::from(&e)),
    })
}

/// GET /market_stats
pub async fn market_stats(State(state): State<Arc<ApiState>>) -> Json<Lookup<MarketBreadth>> {
    let _guard = RequestMetricsGuard::new(&state.market_stats);
    Json(match state.dashboard.market_stats().await {
        Ok(breadth) => Lookup::Found(breadth),
        Err(e) => Lookup::Failed(ErrorResponse::from(&e)),
    })
}

/// GET /greeks
pub async fn greeks(State(state): State<Arc<ApiState>>) -> Result<Json<GreeksReport>, ApiError> {
    let mut guard = RequestMetricsGuard::new(&state.greeks);
    state
        .dashboard
        .greeks()
        .await
        .map(Json)
        .map_err(|e| reject(&mut guard, e))
}
