//! Shutdown broadcast shared by the HTTP server and the cache sweeper.

use tokio::sync::broadcast;

/// Fan-out shutdown signal.
///
/// Each long-running task holds its own receiver. Subscribe before the task
/// starts: a receiver created after `trigger` never sees the signal. Dropping
/// the coordinator closes the channel, which subscribers also treat as stop.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every current subscriber. Repeated calls are harmless.
    pub fn trigger(&self) {
        let notified = self.tx.send(()).unwrap_or(0);
        tracing::debug!(notified, "Shutdown signalled");
    }

    /// Subscribers still holding a receiver.
    pub fn subscribers(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
