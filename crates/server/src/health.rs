//! Health endpoints and upstream connection tracking

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Outcome of the most recent call to one upstream dependency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub service: String,
    pub address: String,
    pub connected: bool,
    pub latency_ms: Option<u64>,
    pub error: Option<String>,
    /// RFC 3339
    pub checked_at: String,
}

/// Upstream clients report here after every call; the health routes read it
pub struct HealthState {
    service_name: String,
    started: Instant,
    connections: RwLock<Vec<ConnectionStatus>>,
}

impl HealthState {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            started: Instant::now(),
            connections: RwLock::new(Vec::new()),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    async fn replace(&self, status: ConnectionStatus) {
        let mut connections = self.connections.write().await;
        match connections.iter_mut().find(|c| c.service == status.service) {
            Some(slot) => *slot = status,
            None => connections.push(status),
        }
    }

    pub async fn record_success(&self, service: &str, address: &str, latency: Duration) {
        self.replace(ConnectionStatus {
            service: service.to_string(),
            address: address.to_string(),
            connected: true,
            latency_ms: Some(latency.as_millis() as u64),
            error: None,
            checked_at: Utc::now().to_rfc3339(),
        })
        .await;
    }

    pub async fn record_failure(&self, service: &str, address: &str, error: impl ToString) {
        self.replace(ConnectionStatus {
            service: service.to_string(),
            address: address.to_string(),
            connected: false,
            latency_ms: None,
            error: Some(error.to_string()),
            checked_at: Utc::now().to_rfc3339(),
        })
        .await;
    }

    pub async fn connections(&self) -> Vec<ConnectionStatus> {
        self.connections.read().await.clone()
    }

    /// No dependency has been seen failing on its last call
    pub async fn is_healthy(&self) -> bool {
        self.connections.read().await.iter().all(|c| c.connected)
    }
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub service: String,
    pub version: &'static str,
    pub timestamp: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct DetailedHealthBody {
    #[serde(flatten)]
    pub summary: HealthBody,
    pub connections: Vec<ConnectionStatus>,
}

fn summary(state: &HealthState, status: &'static str) -> HealthBody {
    HealthBody {
        status,
        service: state.service_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
        uptime_seconds: state.uptime_seconds(),
    }
}

/// `GET /health`: liveness, always 200
pub async fn health_handler(State(state): State<Arc<HealthState>>) -> Json<HealthBody> {
    Json(summary(&state, "ok"))
}

/// Stateless liveness probe for routers without a [`HealthState`]
pub async fn simple_health_handler() -> &'static str {
    "ok"
}

/// `GET /health/detailed`: 503 while the last call to any upstream failed
pub async fn detailed_health_handler(
    State(state): State<Arc<HealthState>>,
) -> (StatusCode, Json<DetailedHealthBody>) {
    let connections = state.connections().await;
    let healthy = connections.iter().all(|c| c.connected);

    let (code, status) = if healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(DetailedHealthBody {
            summary: summary(&state, status),
            connections,
        }),
    )
}

pub fn health_routes(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/health/detailed", get(detailed_health_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_last_outcome_wins() {
        let state = HealthState::new("chainscope");
        assert!(state.is_healthy().await);

        state
            .record_success("upstream", "https://example.test", Duration::from_millis(12))
            .await;
        state
            .record_failure("upstream", "https://example.test", "timed out")
            .await;
        assert!(!state.is_healthy().await);

        let connections = state.connections().await;
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].error.as_deref(), Some("timed out"));

        state
            .record_success("upstream", "https://example.test", Duration::from_millis(9))
            .await;
        assert!(state.is_healthy().await);
    }

    #[tokio::test]
    async fn test_detailed_route_degrades_to_503() {
        let state = Arc::new(HealthState::new("chainscope"));
        let app = health_routes(Arc::clone(&state));

        let ok = app
            .clone()
            .oneshot(Request::get("/health/detailed").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        state.record_failure("upstream", "https://example.test", "403").await;
        let degraded = app
            .oneshot(Request::get("/health/detailed").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(degraded.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
