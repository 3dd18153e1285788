//! Listener lifecycle

use async_trait::async_trait;
use std::future::Future;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::shutdown::ShutdownController;

/// Something that serves until told to stop
#[async_trait]
pub trait Server: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Local address, only while serving
    fn address(&self) -> Option<SocketAddr>;

    fn is_running(&self) -> bool;

    /// Serve until `shutdown` fires, then let in-flight requests finish
    async fn run(&self, shutdown: CancellationToken) -> Result<()>;
}

/// Blanket helpers for every [`Server`]
pub trait ServerExt: Server + Sized {
    /// Serve on a background task; cancel the token to stop it
    fn spawn(self) -> (JoinHandle<Result<()>>, CancellationToken) {
        let stop = CancellationToken::new();
        let task_stop = stop.clone();
        (tokio::spawn(async move { self.run(task_stop).await }), stop)
    }

    /// Serve in the foreground until SIGINT
    fn run_with_ctrl_c(self) -> impl Future<Output = Result<()>> + Send {
        async move {
            let controller = ShutdownController::with_ctrl_c();
            tracing::info!(server = self.name(), "Press Ctrl+C to stop");
            self.run(controller.token()).await
        }
    }
}

impl<T: Server> ServerExt for T {}
