//! API request/response models.

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;
use crate::orchestrator::{WindowMode, WindowQuery};

/// Query parameters for `/window_stats`.
#[derive(Debug, Default, Deserialize)]
pub struct WindowStatsParams {
    pub mode: Option<String>,
    /// Strikes each side of ATM; anything but a non-negative integer falls
    /// back to the configured default
    pub atm_window: Option<String>,
}

impl From<WindowStatsParams> for WindowQuery {
    fn from(params: WindowStatsParams) -> Self {
        Self {
            mode: params.mode.as_deref().map(WindowMode::parse).unwrap_or_default(),
            atm_window: params
                .atm_window
                .and_then(|raw| raw.trim().parse::<u32>().ok()),
        }
    }
}

/// Query parameters for `/candles`.
#[derive(Debug, Default, Deserialize)]
pub struct CandleParams {
    /// `1m` (default), `5m`, `15m` or `1h`
    pub interval: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl From<&DashboardError> for ErrorResponse {
    fn from(e: &DashboardError) -> Self {
        Self {
            error: e.code().to_string(),
            message: e.to_string(),
        }
    }
}

/// Body for lookups that answer 200 even when nothing was found
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Lookup<T> {
    Found(T),
    Failed(ErrorResponse),
}
