//! Early port checks
//!
//! Checking before binding is racy: another process can take the port in
//! between. The bind in [`HttpServer::run`](crate::HttpServer) is what counts;
//! this only gives the operator a clearer error at startup.

use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};

/// Try binding the configured HTTP port and release it immediately
pub async fn validate_port_available(config: &ServerConfig) -> Result<()> {
    if config.http_port == 0 {
        debug!("Ephemeral port requested, skipping availability check");
        return Ok(());
    }

    let addr = format!("{}:{}", config.host, config.http_port);
    match TcpListener::bind(&addr).await {
        Ok(listener) => {
            drop(listener);
            info!(%addr, "HTTP port is available");
            Ok(())
        }
        Err(e) => {
            error!(%addr, %e, "HTTP port is NOT available");
            Err(ServerError::PortUnavailable {
                port: config.http_port,
                reason: e.to_string(),
            })
        }
    }
}

/// Reject port 0 for an explicit bind and warn on privileged ports
pub fn validate_port_range(port: u16) -> Result<()> {
    if port == 0 {
        return Err(ServerError::InvalidPort(port));
    }
    if port < 1024 {
        warn!(port, "Port is privileged and may require elevated permissions");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_port_in_use_detected() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let result = validate_port_available(&ServerConfig::new("127.0.0.1", port)).await;
        assert!(matches!(result, Err(ServerError::PortUnavailable { port: p, .. }) if p == port));

        drop(taken);
        assert!(validate_port_available(&ServerConfig::new("127.0.0.1", port)).await.is_ok());
    }

    #[test]
    fn test_port_range() {
        assert!(validate_port_range(0).is_err());
        assert!(validate_port_range(80).is_ok());
        assert!(validate_port_range(8000).is_ok());
    }
}
