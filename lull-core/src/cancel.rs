//! One-shot cancellation signal shared between a host and a waiting node.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;

/// A one-shot cancellation event owned by the host execution context.
///
/// Clones share the same underlying event. Once fired it stays fired; a new
/// signal is needed for every invocation.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    token: CancellationToken,
    fired: Arc<AtomicBool>,
}

impl CancellationSignal {
    /// Create a new, unfired signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal.
    ///
    /// Returns `true` only for the call that actually fired it.
    pub fn fire(&self) -> bool {
        let first = !self.fired.swap(true, Ordering::SeqCst);
        if first {
            tracing::debug!("Cancellation signal fired");
            self.token.cancel();
        }
        first
    }

    /// Check if the signal has fired.
    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Subscribe to the signal.
    ///
    /// The returned future completes once the signal fires (immediately if it
    /// already has). Dropping it removes the subscription.
    pub fn subscribe(&self) -> impl Future<Output = ()> + Send + use<> {
        self.token.clone().cancelled_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fire_is_one_shot() {
        let signal = CancellationSignal::new();
        assert!(!signal.is_fired());
        assert!(signal.fire());
        assert!(!signal.fire());
        assert!(signal.is_fired());
    }

    #[test]
    fn clones_share_state() {
        let signal = CancellationSignal::new();
        let other = signal.clone();
        other.fire();
        assert!(signal.is_fired());
    }

    #[tokio::test]
    async fn subscription_completes_after_fire() {
        let signal = CancellationSignal::new();
        let sub = signal.subscribe();

        let firing = signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            firing.fire();
        });

        tokio::time::timeout(Duration::from_secs(1), sub)
            .await
            .expect("subscription never completed");
    }

    #[tokio::test]
    async fn late_subscription_completes_immediately() {
        let signal = CancellationSignal::new();
        signal.fire();
        tokio::time::timeout(Duration::from_millis(50), signal.subscribe())
            .await
            .expect("already-fired signal should resolve at once");
    }
}
