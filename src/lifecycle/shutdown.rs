//! Shutdown coordination for the gateway.

use tokio::sync::broadcast;

/// Broadcast-based shutdown trigger.
///
/// The server holds a receiver and stops accepting connections once
/// `trigger` fires; the binary wires OS signals into it, tests call it
/// directly.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver that resolves when shutdown is triggered.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the shutdown signal. Safe to call with no subscribers.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Number of tasks still waiting for the signal.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once `rx` fires or its sender is gone.
pub async fn wait_for(mut rx: broadcast::Receiver<()>) {
    let _ = rx.recv().await;
}
