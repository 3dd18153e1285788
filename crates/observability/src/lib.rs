//! Observability for ChainScope
//!
//! - Structured logging via tracing
//! - Prometheus exporter
//! - Request metrics for the HTTP API and counters for the analytics pipeline
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("chainscope", LogFormat::Pretty, "info")?;
//! observability::metrics::init_metrics(9090)?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{init_metrics, PipelineMetrics, RequestMetricsGuard, ServerMetrics};
