//! Change notification for dashboard consumers.
//!
//! Every successful moderation or termination write emits a change signal.
//! Consumers treat the signal as an invalidation hint and re-query the
//! dashboard services for fresh data; the signal itself carries no state
//! beyond a sequence number and a signup counter.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use homestay_common::AppResult;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A lightweight invalidation signal fanned out to dashboard subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSignal {
    /// Monotonic sequence number, scoped to this process.
    pub seq: u64,
    /// When the underlying write happened.
    pub at: DateTime<Utc>,
    /// Number of new signups observed since startup.
    pub new_signups: u64,
}

/// Abstraction over change broadcasting.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    /// Notify subscribers that moderation or termination state changed.
    async fn publish_change(&self) -> AppResult<()>;

    /// Notify subscribers that a new account signed up.
    async fn publish_signup(&self) -> AppResult<()>;
}

/// Shared handle to a change notifier.
pub type ChangeNotifierHandle = Arc<dyn ChangeNotifier>;

/// No-op notifier for tests and for deployments without realtime.
pub struct NoOpChangeNotifier;

#[async_trait]
impl ChangeNotifier for NoOpChangeNotifier {
    async fn publish_change(&self) -> AppResult<()> {
        Ok(())
    }

    async fn publish_signup(&self) -> AppResult<()> {
        Ok(())
    }
}

/// In-process notifier backed by a tokio broadcast channel.
///
/// Signals are fire-and-forget: a send with no live subscribers is not an
/// error, it just means nobody is watching the dashboard right now.
pub struct BroadcastNotifier {
    tx: broadcast::Sender<ChangeSignal>,
    seq: AtomicU64,
    signups: AtomicU64,
}

impl BroadcastNotifier {
    /// Create a notifier with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            seq: AtomicU64::new(0),
            signups: AtomicU64::new(0),
        }
    }

    /// Subscribe to change signals.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeSignal> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn emit(&self) {
        let signal = ChangeSignal {
            seq: self.seq.fetch_add(1, Ordering::SeqCst) + 1,
            at: Utc::now(),
            new_signups: self.signups.load(Ordering::SeqCst),
        };
        // Ignore send failures: no subscribers is a normal state.
        let _ = self.tx.send(signal);
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl ChangeNotifier for BroadcastNotifier {
    async fn publish_change(&self) -> AppResult<()> {
        self.emit();
        Ok(())
    }

    async fn publish_signup(&self) -> AppResult<()> {
        self.signups.fetch_add(1, Ordering::SeqCst);
        self.emit();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_notifier_delivers_signals() {
        let notifier = BroadcastNotifier::new(8);
        let mut rx = notifier.subscribe();

        notifier.publish_change().await.unwrap();
        let signal = rx.recv().await.unwrap();
        assert_eq!(signal.seq, 1);
        assert_eq!(signal.new_signups, 0);
    }

    #[tokio::test]
    async fn sequence_numbers_are_monotonic() {
        let notifier = BroadcastNotifier::new(8);
        let mut rx = notifier.subscribe();

        notifier.publish_change().await.unwrap();
        notifier.publish_change().await.unwrap();
        notifier.publish_change().await.unwrap();

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        let third = rx.recv().await.unwrap();
        assert!(first.seq < second.seq);
        assert!(second.seq < third.seq);
    }

    #[tokio::test]
    async fn signup_increments_counter() {
        let notifier = BroadcastNotifier::new(8);
        let mut rx = notifier.subscribe();

        notifier.publish_signup().await.unwrap();
        notifier.publish_signup().await.unwrap();

        let _ = rx.recv().await.unwrap();
        let signal = rx.recv().await.unwrap();
        assert_eq!(signal.new_signups, 2);
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_not_an_error() {
        let notifier = BroadcastNotifier::new(8);
        assert!(notifier.publish_change().await.is_ok());
        assert_eq!(notifier.subscriber_count(), 0);
    }
}
