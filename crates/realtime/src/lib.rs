//! Cross-instance realtime feed for homestay-rs.
//!
//! Distributes dashboard change signals over Redis Pub/Sub so that every
//! server instance can push updates to its own SSE subscribers.

pub mod pubsub;

pub use pubsub::{DashboardBridge, FeedEvent, RedisPubSub, channel_names};
