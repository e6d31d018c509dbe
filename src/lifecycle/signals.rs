//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for SIGINT (Ctrl+C) and, on Unix, SIGTERM
//! - Translate either into a `Shutdown::trigger`

use tokio::signal;

use crate::lifecycle::Shutdown;

/// Resolve when the process receives Ctrl+C or SIGTERM.
pub async fn terminate_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

/// Spawn a task that triggers `shutdown` on the first OS signal.
pub fn spawn_signal_listener(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        terminate_signal().await;
        shutdown.trigger();
    })
}
