//! HTTP server infrastructure for ChainScope
//!
//! [`HttpServer`] implements the [`Server`] trait; [`ServerExt`] adds
//! `spawn()` and `run_with_ctrl_c()`. Shutdown is coordinated with a
//! `CancellationToken` from `tokio_util`.
//!
//! ```ignore
//! use server::{HttpServer, ServerConfig, ServerExt};
//!
//! let server = HttpServer::new(ServerConfig::new("0.0.0.0", 8000), router);
//! server.run_with_ctrl_c().await?;
//! ```

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod port_validator;
pub mod shutdown;
pub mod traits;

pub use config::{ports, ServerConfig};
pub use error::{Result, ServerError};
pub use health::{health_routes, ConnectionStatus, HealthState};
pub use http::HttpServer;
pub use port_validator::{validate_port_available, validate_port_range};
pub use shutdown::ShutdownController;
pub use traits::{Server, ServerExt};
