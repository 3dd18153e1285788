//! Axum listener for the dashboard router

use async_trait::async_trait;
use axum::Router;
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::traits::Server;

/// Set while the listener is serving; cleared once it drains
type BoundAddr = Arc<RwLock<Option<SocketAddr>>>;

/// Serves one [`Router`]. Clones share the bound-address slot, so a clone
/// kept aside can observe a server that was moved into a task.
#[derive(Clone)]
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
    bound: BoundAddr,
}

impl HttpServer {
    pub fn new(config: ServerConfig, router: Router) -> Self {
        Self {
            config,
            router,
            bound: Arc::new(RwLock::new(None)),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    async fn bind(&self) -> Result<TcpListener> {
        let addr = self.config.http_addr()?;
        let listener = TcpListener::bind(addr).await.map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        *self.bound.write() = Some(listener.local_addr()?);
        Ok(listener)
    }
}

#[async_trait]
impl Server for HttpServer {
    fn name(&self) -> &str {
        "dashboard-http"
    }

    fn address(&self) -> Option<SocketAddr> {
        *self.bound.read()
    }

    fn is_running(&self) -> bool {
        self.bound.read().is_some()
    }

    async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        let listener = self.bind().await?;
        info!(addr = ?self.address(), "Dashboard HTTP listening");

        let served = axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                info!("Draining in-flight requests");
            })
            .await;

        self.bound.write().take();

        served.map_err(|e| {
            error!(%e, "Dashboard HTTP listener failed");
            ServerError::Io(e)
        })?;
        info!("Dashboard HTTP stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ServerExt;
    use axum::routing::get;
    use std::time::Duration;

    #[tokio::test]
    async fn test_ephemeral_port_and_drain() {
        let router = Router::new().route("/health", get(crate::health::simple_health_handler));
        let server = HttpServer::new(ServerConfig::new("127.0.0.1", 0), router);
        let probe = server.clone();

        let (handle, token) = server.spawn();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(probe.is_running());
        assert!(probe.address().is_some_and(|a| a.port() != 0));

        token.cancel();
        let stopped = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(matches!(stopped, Ok(Ok(Ok(())))));
        assert!(!probe.is_running());
    }

    #[tokio::test]
    async fn test_taken_port_fails_to_bind() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let server = HttpServer::new(ServerConfig::new("127.0.0.1", port), Router::new());
        let result = server.run(CancellationToken::new()).await;
        assert!(matches!(result, Err(ServerError::Bind { .. })));
        assert!(!server.is_running());
    }
}
