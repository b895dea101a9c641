//! Redis Pub/Sub for cross-instance change distribution.
//!
//! Change signals published here reach every server instance; each instance
//! forwards them to its local SSE subscribers through [`DashboardBridge`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fred::clients::{Client, SubscriberClient};
use fred::error::{Error as RedisError, ErrorKind as RedisErrorKind};
use fred::interfaces::{ClientLike, EventInterface, PubsubInterface};
use fred::types::config::Config as RedisConfig;
use homestay_common::{AppError, AppResult};
use homestay_core::services::ChangeNotifier;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Channel names under a deployment key prefix.
#[must_use]
pub fn channel_names(prefix: &str) -> (String, String) {
    (format!("{prefix}:changes"), format!("{prefix}:signups"))
}

/// Events carried over the realtime feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FeedEvent {
    /// Moderation or termination state changed somewhere.
    Changed {
        seq: u64,
        at: DateTime<Utc>,
        new_signups: u64,
    },
    /// A new account signed up.
    SignedUp {
        seq: u64,
        at: DateTime<Utc>,
        new_signups: u64,
    },
}

/// Redis Pub/Sub manager for the dashboard feed.
#[derive(Clone)]
pub struct RedisPubSub {
    publisher: Client,
    subscriber: SubscriberClient,
    /// Local broadcast channel for events received from Redis.
    local_tx: broadcast::Sender<FeedEvent>,
    changes_channel: String,
    signups_channel: String,
    seq: Arc<AtomicU64>,
    signups: Arc<AtomicU64>,
}

impl RedisPubSub {
    /// Create a new Redis Pub/Sub manager. The prefix keys the feed
    /// channels so several deployments can share one Redis.
    pub async fn new(redis_url: &str, prefix: &str) -> Result<Self, RedisError> {
        let config = RedisConfig::from_url(redis_url)?;
        let (changes_channel, signups_channel) = channel_names(prefix);

        let publisher = Client::new(config.clone(), None, None, None);
        publisher.init().await?;

        let subscriber = SubscriberClient::new(config, None, None, None);
        subscriber.init().await?;

        let (local_tx, _) = broadcast::channel(1000);

        info!("Redis Pub/Sub initialized");

        Ok(Self {
            publisher,
            subscriber,
            local_tx,
            changes_channel,
            signups_channel,
            seq: Arc::new(AtomicU64::new(0)),
            signups: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Subscribe to the feed channels and start the event loop.
    pub async fn start(&self) -> Result<(), RedisError> {
        self.subscriber
            .subscribe(self.changes_channel.as_str())
            .await?;
        self.subscriber
            .subscribe(self.signups_channel.as_str())
            .await?;

        info!("Subscribed to Redis Pub/Sub channels");

        let local_tx = self.local_tx.clone();
        let mut message_stream = self.subscriber.message_rx();

        tokio::spawn(async move {
            while let Ok(message) = message_stream.recv().await {
                if let Some(payload) = message.value.as_string() {
                    match serde_json::from_str::<FeedEvent>(&payload) {
                        Ok(event) => {
                            debug!(?event, "Received Pub/Sub event");
                            if local_tx.send(event).is_err() {
                                warn!("No local subscribers for Pub/Sub event");
                            }
                        }
                        Err(e) => {
                            warn!("Failed to parse Pub/Sub message: {}", e);
                        }
                    }
                }
            }
            info!("Pub/Sub message stream ended");
        });

        Ok(())
    }

    /// Publish an event to a channel.
    pub async fn publish(&self, channel: &str, event: &FeedEvent) -> Result<(), RedisError> {
        let payload = serde_json::to_string(event).map_err(|e| {
            RedisError::new(
                RedisErrorKind::InvalidArgument,
                format!("Serialization error: {e}"),
            )
        })?;
        let _: () = self.publisher.publish(channel, payload).await?;
        debug!(channel, ?event, "Published Pub/Sub event");
        Ok(())
    }

    /// Get a receiver for local broadcast events.
    #[must_use]
    pub fn subscribe_local(&self) -> broadcast::Receiver<FeedEvent> {
        self.local_tx.subscribe()
    }

    /// Get the number of local subscribers.
    #[must_use]
    pub fn local_subscriber_count(&self) -> usize {
        self.local_tx.receiver_count()
    }

    /// Shutdown the Pub/Sub manager.
    pub async fn shutdown(&self) -> Result<(), RedisError> {
        self.subscriber.quit().await?;
        self.publisher.quit().await?;
        info!("Redis Pub/Sub shutdown");
        Ok(())
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Core services publish through this impl without depending on the
/// realtime crate directly.
#[async_trait]
impl ChangeNotifier for RedisPubSub {
    async fn publish_change(&self) -> AppResult<()> {
        let event = FeedEvent::Changed {
            seq: self.next_seq(),
            at: Utc::now(),
            new_signups: self.signups.load(Ordering::SeqCst),
        };
        self.publish(&self.changes_channel, &event)
            .await
            .map_err(|e| AppError::Redis(e.to_string()))
    }

    async fn publish_signup(&self) -> AppResult<()> {
        let event = FeedEvent::SignedUp {
            seq: self.next_seq(),
            at: Utc::now(),
            new_signups: self.signups.fetch_add(1, Ordering::SeqCst) + 1,
        };
        self.publish(&self.signups_channel, &event)
            .await
            .map_err(|e| AppError::Redis(e.to_string()))
    }
}

/// Bridge between Redis Pub/Sub and the SSE broadcaster.
pub struct DashboardBridge {
    pubsub: Arc<RedisPubSub>,
}

impl DashboardBridge {
    /// Create a new bridge.
    #[must_use]
    pub const fn new(pubsub: Arc<RedisPubSub>) -> Self {
        Self { pubsub }
    }

    /// Start the bridge, forwarding events from Redis to SSE.
    ///
    /// Takes a callback that receives events and hands them to the SSE
    /// broadcaster.
    pub async fn start<F>(&self, on_event: F)
    where
        F: Fn(FeedEvent) + Send + Sync + 'static,
    {
        let mut rx = self.pubsub.subscribe_local();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => on_event(event),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("SSE bridge lagged by {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("SSE bridge channel closed");
                        break;
                    }
                }
            }
        });
    }
}
