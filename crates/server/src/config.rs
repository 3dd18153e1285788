//! Server bind configuration

use crate::error::{Result, ServerError};
use std::net::SocketAddr;

/// Default port assignments
pub mod ports {
    /// Dashboard HTTP API
    pub const DASHBOARD_HTTP: u16 = 8000;
    /// Prometheus exporter, when enabled
    pub const METRICS: u16 = 9090;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port 0 asks the OS for an ephemeral port
    pub http_port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, http_port: u16) -> Self {
        Self {
            host: host.into(),
            http_port,
        }
    }

    pub fn http_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.http_port)
            .parse()
            .map_err(|_| ServerError::InvalidAddress(format!("{}:{}", self.host, self.http_port)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("0.0.0.0", ports::DASHBOARD_HTTP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binds_dashboard_port() {
        let config = ServerConfig::default();
        assert_eq!(config.http_port, 8000);
        assert_eq!(config.http_addr().unwrap().port(), 8000);
    }

    #[test]
    fn test_invalid_host() {
        let config = ServerConfig::new("not a host", 8000);
        assert!(matches!(config.http_addr(), Err(ServerError::InvalidAddress(_))));
    }
}
