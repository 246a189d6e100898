//! Cooperative shutdown controller.
//!
//! `main.rs` combines this with OS signals: a watcher task requests shutdown
//! on Ctrl+C or SIGTERM, and both the monitor loop and the health responder
//! observe the same controller.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::Notify;

/// Cooperative shutdown signal used for graceful exit.
#[derive(Clone, Debug, Default)]
pub struct ShutdownController {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    requested: AtomicBool,
    notify: Notify,
}

impl ShutdownController {
    /// Returns true if shutdown has been requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.inner.requested.load(Ordering::Relaxed)
    }

    /// Request shutdown and wake all waiters.
    pub fn request_shutdown(&self) {
        self.inner.requested.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Wait until shutdown is requested.
    pub async fn wait(&self) {
        if self.is_shutdown_requested() {
            return;
        }
        self.inner.notify.notified().await;
    }
}

/// Wait for an OS interrupt and request shutdown on the controller.
pub async fn watch_signals(shutdown: ShutdownController) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }

    shutdown.request_shutdown();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_completes_when_shutdown_requested() {
        let shutdown = ShutdownController::default();
        let waiter = shutdown.clone();
        let wait_task = tokio::spawn(async move { waiter.wait().await });

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!shutdown.is_shutdown_requested());
        shutdown.request_shutdown();

        tokio::time::timeout(std::time::Duration::from_secs(2), wait_task)
            .await
            .expect("waiter timed out")
            .expect("waiter panicked");
        assert!(shutdown.is_shutdown_requested());
    }

    #[tokio::test]
    async fn wait_returns_immediately_after_request() {
        let shutdown = ShutdownController::default();
        shutdown.request_shutdown();
        shutdown.wait().await;
    }
}
