//! Shutdown signalling for the tick loops.
//!
//! The controller holds the current [`ShutdownReason`] in a
//! `tokio::sync::watch` channel. A listener created after the trigger still
//! observes it, so a loop that starts late never misses a stop. The node
//! re-arms the controller on every `start`.

use tokio::signal;
use tokio::sync::watch;

/// Why the node is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Interrupt,
    Terminate,
    Requested,
}

impl ShutdownReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
            Self::Requested => "requested",
        }
    }
}

pub struct ShutdownController {
    tx: watch::Sender<Option<ShutdownReason>>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Record `reason` and wake every listener. The first reason sticks
    /// until [`rearm`](Self::rearm).
    pub fn trigger(&self, reason: ShutdownReason) {
        let first = self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });
        if first {
            tracing::info!(reason = reason.as_str(), "shutdown triggered");
        }
    }

    pub fn shutdown(&self) {
        self.trigger(ShutdownReason::Requested);
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        *self.tx.borrow()
    }

    pub fn is_triggered(&self) -> bool {
        self.reason().is_some()
    }

    /// Clear a previous trigger so the loops of a new `start` keep running.
    pub fn rearm(&self) {
        self.tx.send_replace(None);
    }

    /// Wait for SIGINT, SIGTERM or a programmatic trigger, whichever
    /// comes first.
    pub async fn wait_for_signal(&self) -> ShutdownReason {
        let mut listener = self.listener();

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "SIGTERM handler unavailable");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = signal::ctrl_c() => self.trigger(ShutdownReason::Interrupt),
            _ = terminate => self.trigger(ShutdownReason::Terminate),
            _ = listener.triggered() => {}
        }

        self.reason().unwrap_or(ShutdownReason::Requested)
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side held by each tick loop.
pub struct ShutdownListener {
    rx: watch::Receiver<Option<ShutdownReason>>,
}

impl ShutdownListener {
    /// Resolves once the controller is triggered, or immediately if it
    /// already was. A dropped controller counts as a request.
    pub async fn triggered(&mut self) -> ShutdownReason {
        match self.rx.wait_for(Option::is_some).await {
            Ok(reason) => (*reason).unwrap_or(ShutdownReason::Requested),
            Err(_) => ShutdownReason::Requested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn listeners_see_the_trigger_reason() {
        let controller = ShutdownController::new();
        let mut a = controller.listener();
        let mut b = controller.listener();
        controller.trigger(ShutdownReason::Terminate);
        assert_eq!(a.triggered().await, ShutdownReason::Terminate);
        assert_eq!(b.triggered().await, ShutdownReason::Terminate);
    }

    #[tokio::test]
    async fn late_listener_observes_earlier_trigger() {
        let controller = ShutdownController::new();
        controller.shutdown();
        let mut late = controller.listener();
        assert_eq!(late.triggered().await, ShutdownReason::Requested);
    }

    #[test]
    fn first_reason_wins() {
        let controller = ShutdownController::new();
        controller.trigger(ShutdownReason::Interrupt);
        controller.trigger(ShutdownReason::Terminate);
        assert_eq!(controller.reason(), Some(ShutdownReason::Interrupt));
    }

    #[tokio::test]
    async fn rearm_clears_the_trigger() {
        let controller = ShutdownController::new();
        controller.shutdown();
        controller.rearm();
        assert!(!controller.is_triggered());

        let mut listener = controller.listener();
        let pending = tokio::time::timeout(Duration::from_millis(50), listener.triggered()).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn wait_for_signal_returns_on_programmatic_trigger() {
        let controller = std::sync::Arc::new(ShutdownController::new());
        let waiter = {
            let controller = std::sync::Arc::clone(&controller);
            tokio::spawn(async move { controller.wait_for_signal().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        controller.shutdown();
        let reason = tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .expect("waiter finished")
            .expect("waiter joined");
        assert_eq!(reason, ShutdownReason::Requested);
    }

    #[tokio::test]
    async fn dropped_controller_releases_listeners() {
        let controller = ShutdownController::new();
        let mut listener = controller.listener();
        drop(controller);
        assert_eq!(listener.triggered().await, ShutdownReason::Requested);
    }
}
