//! Cooperative shutdown built on `CancellationToken`

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Owns the root token; listeners hold clones or children of it
#[derive(Clone, Default)]
pub struct ShutdownController {
    root: CancellationToken,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancelled by the first SIGINT
    pub fn with_ctrl_c() -> Self {
        let controller = Self::new();
        let root = controller.root.clone();

        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(%e, "Ctrl+C handler unavailable, shutdown only on request");
                return;
            }
            info!("Ctrl+C received, shutting down");
            root.cancel();
        });

        controller
    }

    /// Follows the root but can be cancelled alone
    pub fn child_token(&self) -> CancellationToken {
        self.root.child_token()
    }

    pub fn token(&self) -> CancellationToken {
        self.root.clone()
    }

    pub fn shutdown(&self) {
        info!("Shutdown requested");
        self.root.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.root.is_cancelled()
    }
}
