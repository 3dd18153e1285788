//! Prometheus metrics

use metrics::{counter, histogram, Counter, Histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Start the Prometheus exporter; metrics are served at `/metrics` on `port`
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// Per-endpoint request metrics
///
/// * `server_requests_total{endpoint}`
/// * `server_requests_by_status{endpoint, status}`
/// * `server_request_duration_seconds{endpoint}`
#[derive(Clone)]
pub struct ServerMetrics {
    requests_total: Counter,
    request_duration: Histogram,
    endpoint: &'static str,
}

impl ServerMetrics {
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            requests_total: counter!("server_requests_total", "endpoint" => endpoint),
            request_duration: histogram!("server_request_duration_seconds", "endpoint" => endpoint),
            endpoint,
        }
    }

    pub fn record_request(&self, duration: Duration, status_code: u16) {
        self.requests_total.increment(1);
        counter!(
            "server_requests_by_status",
            "endpoint" => self.endpoint,
            "status" => status_code.to_string()
        )
        .increment(1);
        self.request_duration.record(duration.as_secs_f64());
    }

    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }
}

/// Records duration and status when dropped
///
/// ```ignore
/// let metrics = ServerMetrics::new("window_stats");
/// let mut guard = RequestMetricsGuard::new(&metrics);
/// // ... handle request ...
/// guard.set_status(502);
/// ```
pub struct RequestMetricsGuard<'a> {
    metrics: &'a ServerMetrics,
    start: Instant,
    status_code: u16,
}

impl<'a> RequestMetricsGuard<'a> {
    pub fn new(metrics: &'a ServerMetrics) -> Self {
        Self {
            metrics,
            start: Instant::now(),
            status_code: 200,
        }
    }

    pub fn set_status(&mut self, code: u16) {
        self.status_code = code;
    }
}

impl Drop for RequestMetricsGuard<'_> {
    fn drop(&mut self) {
        self.metrics.record_request(self.start.elapsed(), self.status_code);
    }
}

/// Counters for the fetch / analytics / persistence pipeline
#[derive(Clone)]
pub struct PipelineMetrics {
    upstream_failures: Counter,
    persistence_failures: Counter,
    snapshots_recorded: Counter,
    upstream_latency: Histogram,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            upstream_failures: counter!("upstream_fetch_failures_total"),
            persistence_failures: counter!("persistence_failures_total"),
            snapshots_recorded: counter!("snapshots_recorded_total"),
            upstream_latency: histogram!("upstream_fetch_duration_seconds"),
        }
    }

    pub fn upstream_failed(&self) {
        self.upstream_failures.increment(1);
    }

    pub fn upstream_fetched(&self, duration: Duration) {
        self.upstream_latency.record(duration.as_secs_f64());
    }

    pub fn persistence_failed(&self) {
        self.persistence_failures.increment(1);
    }

    pub fn snapshot_recorded(&self) {
        self.snapshots_recorded.increment(1);
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_without_recorder_are_noops() {
        let metrics = ServerMetrics::new("candles");
        assert_eq!(metrics.endpoint(), "candles");
        {
            let mut guard = RequestMetricsGuard::new(&metrics);
            guard.set_status(404);
        }

        let pipeline = PipelineMetrics::default();
        pipeline.upstream_failed();
        pipeline.snapshot_recorded();
    }
}
