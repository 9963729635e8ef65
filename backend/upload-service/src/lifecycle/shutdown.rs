/// Graceful shutdown coordinator
///
/// On SIGINT/SIGTERM the HTTP server stops accepting connections and lets
/// in-flight requests finish within the configured grace period. Detached
/// background tasks are not awaited and not cancelled; whatever is still
/// running is reported and dies with the process.
use std::future::Future;

use actix_web::dev::ServerHandle;
use tracing::{error, info, warn};

use crate::services::BackgroundTasks;

/// Resolves on the first SIGINT or SIGTERM
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                wait_for_ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        wait_for_ctrl_c().await;
    }
}

async fn wait_for_ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", err);
        std::future::pending::<()>().await;
    }
}

pub struct ShutdownCoordinator {
    server: ServerHandle,
    tasks: BackgroundTasks,
}

impl ShutdownCoordinator {
    pub fn new(server: ServerHandle, tasks: BackgroundTasks) -> Self {
        Self { server, tasks }
    }

    /// Wait for `signal`, then drain the HTTP server
    pub async fn run<S>(self, signal: S)
    where
        S: Future<Output = ()>,
    {
        signal.await;
        info!("Shutdown signal received, draining in-flight requests");

        self.server.stop(true).await;

        let pending = self.tasks.in_flight();
        if pending > 0 {
            warn!(pending, "Exiting with background tasks still running");
        }
        info!("Upload service stopped accepting requests");
    }
}
