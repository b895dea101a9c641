//! HTTP API layer for homestay-rs.
//!
//! This crate provides the REST API and the realtime dashboard feed:
//!
//! - **Endpoints**: account signup, admin moderation, termination workflow
//! - **Extractors**: token authentication, admin authorization
//! - **Middleware**: bearer token resolution
//! - **SSE**: live dashboard change feed
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod sse;

pub use endpoints::router;
pub use middleware::AppState;
pub use sse::{DashboardBroadcaster, SseEvent};
